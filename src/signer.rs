//! The signature primitive used by the resolver.
//!
//! [`WitnessSigner`] turns a signing program and a key into a finished witness
//! stack. [`EcdsaWitnessSigner`] does this for segwit v0 key-hash programs: it
//! computes the BIP143 digest through rust-bitcoin's [`SighashCache`], which
//! expands the p2wpkh program into its p2pkh script code, and signs it with
//! ECDSA.
use std::borrow::Borrow;

use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{Amount, Script, Transaction, Witness};
use log::debug;
use secp256k1::{All, Message, Secp256k1};

use crate::{keys::PrivateKey, Error, Result};

pub trait WitnessSigner {
    /// Signs input `input_index` and returns the witness stack spending it.
    ///
    /// # Arguments
    ///
    /// * `sighashes` - Sighash midstate for the transaction being signed. It can be shared between all inputs of that transaction.
    /// * `input_index` - Index of the input being signed.
    /// * `value` - Value of the output the input spends.
    /// * `signing_program` - The witness program committed to by the digest.
    /// * `hash_type` - Which parts of the transaction the signature commits to.
    /// * `key` - The key to sign with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SigningFailed`] if the digest cannot be computed, e.g. the index is out of bounds or the program is not a p2wpkh program.
    fn witness_signature<T: Borrow<Transaction>>(
        &self,
        sighashes: &mut SighashCache<T>,
        input_index: usize,
        value: Amount,
        signing_program: &Script,
        hash_type: EcdsaSighashType,
        key: &PrivateKey,
    ) -> Result<Witness>;
}

/// Produces `[<DER signature || hash type>, <compressed pubkey>]` witnesses.
#[derive(Clone, Debug)]
pub struct EcdsaWitnessSigner {
    secp: Secp256k1<All>,
    low_r: bool,
}

impl EcdsaWitnessSigner {
    pub fn new(low_r: bool) -> Self {
        EcdsaWitnessSigner {
            secp: Secp256k1::new(),
            low_r,
        }
    }
}

impl Default for EcdsaWitnessSigner {
    fn default() -> Self {
        EcdsaWitnessSigner::new(true)
    }
}

impl WitnessSigner for EcdsaWitnessSigner {
    fn witness_signature<T: Borrow<Transaction>>(
        &self,
        sighashes: &mut SighashCache<T>,
        input_index: usize,
        value: Amount,
        signing_program: &Script,
        hash_type: EcdsaSighashType,
        key: &PrivateKey,
    ) -> Result<Witness> {
        let sighash = sighashes
            .p2wpkh_signature_hash(input_index, signing_program, value, hash_type)
            .map_err(|e| Error::SigningFailed(format!("sighash error: {}", e)))?;
        let msg = Message::from_digest_slice(&sighash[..])
            .map_err(|e| Error::SigningFailed(format!("message creation error: {}", e)))?;

        let signature = if self.low_r {
            self.secp.sign_ecdsa_low_r(&msg, key.as_secret_key())
        } else {
            self.secp.sign_ecdsa(&msg, key.as_secret_key())
        };

        let mut sig = signature.serialize_der().to_vec();
        sig.push(hash_type.to_u32() as u8);
        let pubkey = key.public_key(&self.secp).serialize();

        debug!(
            "signed input {} with {:?} ({} byte signature)",
            input_index,
            hash_type,
            sig.len()
        );

        Ok(Witness::from_slice(&[sig, pubkey.to_vec()]))
    }
}
