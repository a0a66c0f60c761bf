//! Verification of produced unlocking data.
//!
//! This checks a witness and signature script the way a node would for the two
//! output kinds the resolver produces, without running a script interpreter.
use std::borrow::Borrow;

use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{ScriptBuf, Transaction, TxOut};
use bitcoin_hashes::{hash160, Hash};
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, Verification};

use crate::{
    resolver::InputScript,
    utils::{
        script::{is_p2wpkh, p2sh_hash, p2wpkh_hash, single_push_data},
        COMPRESSED_PUBKEY_SIZE,
    },
    Error, Result,
};

fn failed(msg: &str) -> Error {
    Error::VerificationFailed(msg.to_owned())
}

/// Checks that `input_script` spends `output` at input `input_index`.
///
/// # Arguments
///
/// * `sighashes` - Sighash midstate of the spending transaction.
/// * `input_index` - Index of the input carrying `input_script`.
/// * `output` - The output being spent.
/// * `input_script` - Witness and signature script to check.
///
/// # Errors
///
/// Returns [`Error::VerificationFailed`] if:
///
/// * The output is neither p2wpkh nor p2sh.
/// * A p2wpkh spend carries a signature script, or a p2sh spend does not push exactly a p2wpkh program matching the script hash.
/// * The witness is not `[signature, compressed pubkey]`, or the pubkey does not match the program.
/// * The signature does not verify against the BIP143 digest for its hash type.
pub fn verify_input_script<T: Borrow<Transaction>, C: Verification>(
    secp: &Secp256k1<C>,
    sighashes: &mut SighashCache<T>,
    input_index: usize,
    output: &TxOut,
    input_script: &InputScript,
) -> Result<()> {
    let spk = output.script_pubkey.as_bytes();

    let program = if is_p2wpkh(spk) {
        if !input_script.script_sig.is_empty() {
            return Err(failed("non empty script_sig for spending a p2wpkh output"));
        }
        output.script_pubkey.clone()
    } else if let Some(script_hash) = p2sh_hash(spk) {
        let redeem_script = single_push_data(&input_script.script_sig)
            .ok_or_else(|| failed("script_sig is not a single push"))?;
        if !is_p2wpkh(redeem_script) {
            return Err(failed("redeem script is not a p2wpkh program"));
        }
        if hash160::Hash::hash(redeem_script).to_byte_array() != script_hash {
            return Err(failed("redeem script does not match the script hash"));
        }
        ScriptBuf::from_bytes(redeem_script.to_vec())
    } else {
        return Err(failed("output is neither p2wpkh nor p2sh"));
    };

    let pubkey_hash =
        p2wpkh_hash(program.as_bytes()).ok_or_else(|| failed("invalid witness program"))?;

    let items: Vec<&[u8]> = input_script.witness.iter().collect();
    let (sig_bytes, pubkey_bytes) = match items.as_slice() {
        [sig, pubkey] => (*sig, *pubkey),
        _ => {
            return Err(Error::VerificationFailed(format!(
                "expected 2 witness items, got {}",
                items.len()
            )))
        }
    };

    if pubkey_bytes.len() != COMPRESSED_PUBKEY_SIZE {
        return Err(failed("witness pubkey is not compressed"));
    }
    if hash160::Hash::hash(pubkey_bytes).to_byte_array() != pubkey_hash {
        return Err(failed("witness pubkey does not match the program"));
    }
    let pubkey =
        PublicKey::from_slice(pubkey_bytes).map_err(|_| failed("invalid witness pubkey"))?;

    let (hash_type_byte, der) = sig_bytes
        .split_last()
        .ok_or_else(|| failed("empty signature"))?;
    let hash_type = EcdsaSighashType::from_standard(u32::from(*hash_type_byte))
        .map_err(|e| Error::VerificationFailed(e.to_string()))?;
    let signature = Signature::from_der(der).map_err(|_| failed("invalid DER signature"))?;

    let sighash = sighashes
        .p2wpkh_signature_hash(input_index, &program, output.value, hash_type)
        .map_err(|e| Error::VerificationFailed(e.to_string()))?;
    let msg = Message::from_digest_slice(&sighash[..])?;

    secp.verify_ecdsa(&msg, &signature, &pubkey)
        .map_err(|_| failed("signature does not verify"))
}
