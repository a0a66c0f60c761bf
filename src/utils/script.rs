//! Output script templates.
use bitcoin::script::{Builder, Instruction, PushBytesBuf};
use bitcoin::{Script, ScriptBuf};

use crate::{
    utils::{
        OP_0, OP_1, OP_CHECKSIG, OP_DUP, OP_EQUAL, OP_EQUALVERIFY, OP_HASH160, OP_PUSHBYTES_20,
        OP_PUSHBYTES_32,
    },
    Error, Result,
};

/// Length in bytes of a p2wpkh witness program: `OP_0 <20-byte-hash>`.
pub const P2WPKH_PROGRAM_SIZE: usize = 22;

/// `OP_0 <pubkey_hash>`
pub fn p2wpkh_script(pubkey_hash: &[u8; 20]) -> ScriptBuf {
    let mut bytes = Vec::with_capacity(P2WPKH_PROGRAM_SIZE);
    bytes.extend_from_slice(&[OP_0, OP_PUSHBYTES_20]);
    bytes.extend_from_slice(pubkey_hash);
    ScriptBuf::from_bytes(bytes)
}

/// `OP_HASH160 <script_hash> OP_EQUAL`
pub fn p2sh_script(script_hash: &[u8; 20]) -> ScriptBuf {
    let mut bytes = Vec::with_capacity(23);
    bytes.extend_from_slice(&[OP_HASH160, OP_PUSHBYTES_20]);
    bytes.extend_from_slice(script_hash);
    bytes.push(OP_EQUAL);
    ScriptBuf::from_bytes(bytes)
}

/// `OP_DUP OP_HASH160 <pubkey_hash> OP_EQUALVERIFY OP_CHECKSIG`
pub fn p2pkh_script(pubkey_hash: &[u8; 20]) -> ScriptBuf {
    let mut bytes = Vec::with_capacity(25);
    bytes.extend_from_slice(&[OP_DUP, OP_HASH160, OP_PUSHBYTES_20]);
    bytes.extend_from_slice(pubkey_hash);
    bytes.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    ScriptBuf::from_bytes(bytes)
}

/// A script consisting of exactly one minimal data push of `data`.
pub fn single_push_script(data: &[u8]) -> Result<ScriptBuf> {
    let push = PushBytesBuf::try_from(data.to_vec())
        .map_err(|e| Error::InvalidScript(format!("cannot push {} bytes: {}", data.len(), e)))?;

    Ok(Builder::new().push_slice(push).into_script())
}

/// Returns the pushed bytes if `script` is a single data push and nothing else.
pub fn single_push_data(script: &Script) -> Option<&[u8]> {
    let mut instructions = script.instructions();
    match (instructions.next(), instructions.next()) {
        (Some(Ok(Instruction::PushBytes(data))), None) => Some(data.as_bytes()),
        _ => None,
    }
}

pub fn is_p2wpkh(spk: &[u8]) -> bool {
    matches!(spk, [OP_0, OP_PUSHBYTES_20, ..] if spk.len() == P2WPKH_PROGRAM_SIZE)
}

pub fn is_p2sh(spk: &[u8]) -> bool {
    matches!(spk, [OP_HASH160, OP_PUSHBYTES_20, .., OP_EQUAL] if spk.len() == 23)
}

pub fn is_p2pkh(spk: &[u8]) -> bool {
    matches!(spk, [OP_DUP, OP_HASH160, OP_PUSHBYTES_20, .., OP_EQUALVERIFY, OP_CHECKSIG] if spk.len() == 25)
}

pub fn is_p2tr(spk: &[u8]) -> bool {
    matches!(spk, [OP_1, OP_PUSHBYTES_32, ..] if spk.len() == 34)
}

/// The 20-byte hash committed to by a p2wpkh program.
pub fn p2wpkh_hash(spk: &[u8]) -> Option<[u8; 20]> {
    if !is_p2wpkh(spk) {
        return None;
    }
    spk[2..22].try_into().ok()
}

/// The 20-byte script hash committed to by a p2sh output.
pub fn p2sh_hash(spk: &[u8]) -> Option<[u8; 20]> {
    if !is_p2sh(spk) {
        return None;
    }
    spk[2..22].try_into().ok()
}
