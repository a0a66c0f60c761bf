//! Script templates and verification helpers.
//!
//! These sit below the resolver: `script` builds and recognises the output
//! templates the wallet signs for, `verify` checks produced unlocking data
//! against the output it spends.
pub mod script;
pub mod verify;

// Define OP_CODES used in script template matching for readability
pub(crate) const OP_0: u8 = 0x00;
pub(crate) const OP_1: u8 = 0x51;
pub(crate) const OP_PUSHBYTES_20: u8 = 0x14;
pub(crate) const OP_PUSHBYTES_32: u8 = 0x20;
pub(crate) const OP_HASH160: u8 = 0xA9;
pub(crate) const OP_EQUAL: u8 = 0x87;
pub(crate) const OP_DUP: u8 = 0x76;
pub(crate) const OP_EQUALVERIFY: u8 = 0x88;
pub(crate) const OP_CHECKSIG: u8 = 0xAC;

// Only compressed pubkeys can be used with segwit v0 outputs
pub(crate) const COMPRESSED_PUBKEY_SIZE: usize = 33;
