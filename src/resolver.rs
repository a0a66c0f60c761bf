//! Input script resolution.
//!
//! The most relevant function is [`Resolver::compute_input_script`], which
//! produces the witness stack and signature script spending one wallet-owned
//! output. It handles native p2wpkh outputs and p2wpkh programs nested in a
//! p2sh output.
//!
//! For signing every input of a transaction at once, use
//! [`Resolver::sign_transaction`].
use std::borrow::Borrow;

use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{ScriptBuf, Transaction, TxOut, Witness};
use bitcoin_hashes::{hash160, Hash};
use log::{debug, log_enabled, warn, Level};
use secp256k1::{All, Secp256k1};

use crate::{
    config::ResolverConfig,
    keys::{PrivKeyTweaker, PrivateKey},
    keystore::{AddressType, KeyStore},
    signer::{EcdsaWitnessSigner, WitnessSigner},
    utils::{
        script::{p2sh_hash, p2wpkh_script, single_push_script},
        verify::verify_input_script,
    },
    Error, Result,
};

/// Unlocking data for one input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputScript {
    /// The witness stack: signature followed by the compressed public key.
    pub witness: Witness,
    /// Empty for native p2wpkh spends, a single push of the witness program
    /// for nested p2wpkh spends.
    pub script_sig: ScriptBuf,
}

/// Resolves unlocking data for outputs owned by a [`KeyStore`].
///
/// The resolver never mutates the key store and keeps no per-call state, so a
/// single instance can serve concurrent calls for different inputs.
#[derive(Debug)]
pub struct Resolver<K, S = EcdsaWitnessSigner> {
    keystore: K,
    signer: S,
    config: ResolverConfig,
    secp: Secp256k1<All>,
}

impl<K: KeyStore> Resolver<K> {
    pub fn new(keystore: K) -> Self {
        Resolver::with_config(keystore, ResolverConfig::default())
    }

    pub fn with_config(keystore: K, config: ResolverConfig) -> Self {
        let signer = EcdsaWitnessSigner::new(config.low_r_signatures);
        Resolver::with_signer(keystore, signer, config)
    }
}

impl<K: KeyStore, S: WitnessSigner> Resolver<K, S> {
    /// Creates a resolver that signs through `signer`.
    pub fn with_signer(keystore: K, signer: S, config: ResolverConfig) -> Self {
        Resolver {
            keystore,
            signer,
            config,
            secp: Secp256k1::new(),
        }
    }

    pub fn keystore(&self) -> &K {
        &self.keystore
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Computes the witness stack and signature script spending `output`.
    ///
    /// # Arguments
    ///
    /// * `tx` - The spending transaction.
    /// * `output` - The previous output spent by input `input_index`.
    /// * `input_index` - Index of the input in `tx`.
    /// * `sighashes` - Sighash midstate for `tx`. It must be built over the same transaction and can be reused for all of its inputs.
    /// * `hash_type` - The sighash type to sign with.
    /// * `tweaker` - Optional hook that replaces the private key right before signing.
    ///
    /// # Returns
    ///
    /// The [`InputScript`] to place into the input. For native p2wpkh outputs the signature script is empty.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    ///
    /// * `input_index` is not an input of `tx`.
    /// * No wallet address owns the output script, or its private key is not available.
    /// * The owning address is not a p2wpkh or nested p2wpkh address.
    /// * The address's key does not derive the program the output commits to.
    /// * The tweak hook fails.
    /// * Signing fails, or signature verification fails when enabled in the config.
    pub fn compute_input_script<T: Borrow<Transaction>>(
        &self,
        tx: &Transaction,
        output: &TxOut,
        input_index: usize,
        sighashes: &mut SighashCache<T>,
        hash_type: EcdsaSighashType,
        tweaker: Option<PrivKeyTweaker<'_>>,
    ) -> Result<InputScript> {
        if input_index >= tx.input.len() {
            return Err(Error::InvalidInputIndex {
                index: input_index,
                inputs: tx.input.len(),
            });
        }

        // First make sure we own the output and can produce its private key.
        let address = self
            .keystore
            .address_for_script(&output.script_pubkey)
            .ok_or_else(|| Error::UnknownOutput(hex::encode(output.script_pubkey.as_bytes())))?;
        let privkey = address.private_key()?;
        let address_type = address.address_type();

        if log_enabled!(Level::Debug) {
            let encoded = address
                .address(self.config.network)
                .map(|a| a.to_string())
                .unwrap_or_else(|_| hex::encode(output.script_pubkey.as_bytes()));
            debug!(
                "resolving input {} of {} spending {:?} output {}",
                input_index,
                tx.txid(),
                address_type,
                encoded
            );
        }

        let (signing_program, script_sig) =
            self.signing_program(address_type, output, &privkey)?;

        // The program above commits to the untweaked key; only signing sees
        // the tweaked one.
        let privkey = match tweaker {
            Some(tweak) => tweak(privkey).map_err(|e| {
                warn!("private key tweak failed for input {}: {}", input_index, e);
                Error::TweakFailed(e)
            })?,
            None => privkey,
        };

        let witness = self.signer.witness_signature(
            sighashes,
            input_index,
            output.value,
            &signing_program,
            hash_type,
            &privkey,
        )?;
        drop(privkey);

        let input_script = InputScript {
            witness,
            script_sig,
        };

        if self.config.verify_signatures {
            verify_input_script(&self.secp, sighashes, input_index, output, &input_script)
                .map_err(|e| {
                    warn!("produced input script for input {} is invalid: {}", input_index, e);
                    Error::SigningFailed(e.to_string())
                })?;
        }

        Ok(input_script)
    }

    /// Resolves every input of `tx` against `prevouts` and writes the results
    /// into the transaction.
    ///
    /// `prevouts[i]` must be the output spent by `tx.input[i]`. All inputs are
    /// resolved before any is written, so on error `tx` is left unchanged.
    pub fn sign_transaction(
        &self,
        tx: &mut Transaction,
        prevouts: &[TxOut],
        hash_type: EcdsaSighashType,
        tweaker: Option<PrivKeyTweaker<'_>>,
    ) -> Result<()> {
        if prevouts.len() != tx.input.len() {
            return Err(Error::PrevoutMismatch {
                inputs: tx.input.len(),
                prevouts: prevouts.len(),
            });
        }

        let input_scripts = {
            let unsigned: &Transaction = tx;
            let mut sighashes = SighashCache::new(unsigned);
            prevouts
                .iter()
                .enumerate()
                .map(|(input_index, prevout)| {
                    self.compute_input_script(
                        unsigned,
                        prevout,
                        input_index,
                        &mut sighashes,
                        hash_type,
                        tweaker,
                    )
                })
                .collect::<Result<Vec<_>>>()?
        };

        for (txin, input_script) in tx.input.iter_mut().zip(input_scripts) {
            txin.witness = input_script.witness;
            txin.script_sig = input_script.script_sig;
        }

        Ok(())
    }

    /// The program the signature digest commits to, and the signature script
    /// that goes with it.
    ///
    /// The program is derived from the untweaked key and must be the one the
    /// spent output commits to.
    fn signing_program(
        &self,
        address_type: AddressType,
        output: &TxOut,
        privkey: &PrivateKey,
    ) -> Result<(ScriptBuf, ScriptBuf)> {
        let spk = output.script_pubkey.as_bytes();
        let program = p2wpkh_script(&privkey.pubkey_hash(&self.secp));

        match address_type {
            // A p2wpkh program nested in p2sh: the signature script pushes the
            // program, which is also what the digest commits to.
            AddressType::NestedWitnessPubKey => {
                let script_hash = hash160::Hash::hash(program.as_bytes()).to_byte_array();
                if p2sh_hash(spk) != Some(script_hash) {
                    return Err(key_mismatch(address_type, output));
                }
                let script_sig = single_push_script(program.as_bytes())?;
                Ok((program, script_sig))
            }
            // Native p2wpkh: the output script is the program. The sighash
            // algorithm expands it into the p2pkh script code.
            AddressType::WitnessPubKeyHash => {
                if program.as_bytes() != spk {
                    return Err(key_mismatch(address_type, output));
                }
                Ok((program, ScriptBuf::new()))
            }
            AddressType::PubKeyHash
            | AddressType::Script
            | AddressType::WitnessScript
            | AddressType::Taproot => Err(Error::UnsupportedAddressType(address_type)),
        }
    }
}

fn key_mismatch(address_type: AddressType, output: &TxOut) -> Error {
    warn!(
        "wallet key does not control {:?} output {}",
        address_type,
        hex::encode(output.script_pubkey.as_bytes())
    );
    Error::KeyMismatch(format!(
        "{:?} key does not sign for output script {}",
        address_type,
        hex::encode(output.script_pubkey.as_bytes())
    ))
}
