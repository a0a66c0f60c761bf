//! Wallet key lookup.
//!
//! The resolver only needs one question answered: which managed address owns
//! this output script, and can it produce a private key? [`KeyStore`] is that
//! seam. [`MemoryKeyStore`] is a simple thread-safe implementation, keyed by
//! output script.
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use bitcoin::{Address, Script, ScriptBuf};
use bitcoin_hashes::{hash160, Hash};
use log::debug;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::Network,
    keys::PrivateKey,
    utils::script::{p2pkh_script, p2sh_script, p2wpkh_script},
    Error, Result,
};

/// The kind of output script a managed address was created for.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum AddressType {
    /// Legacy pay-to-pubkey-hash.
    PubKeyHash,
    /// Native segwit v0 pay-to-witness-pubkey-hash.
    WitnessPubKeyHash,
    /// A p2wpkh program wrapped in pay-to-script-hash.
    NestedWitnessPubKey,
    /// Pay-to-script-hash with an arbitrary redeem script.
    Script,
    /// Pay-to-witness-script-hash.
    WitnessScript,
    /// Segwit v1 output.
    Taproot,
}

/// The wallet's record for one address: its type, public key and, unless the
/// address is watch-only, its private key.
#[derive(Clone, Debug)]
pub struct ManagedAddress {
    address_type: AddressType,
    script_pubkey: ScriptBuf,
    pubkey: PublicKey,
    privkey: Option<PrivateKey>,
}

impl ManagedAddress {
    /// Creates a managed address for `pubkey`, deriving its output script from
    /// `address_type`. Only key-hash address types can be derived from a key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyMismatch`] if `privkey` is not the private key of
    /// `pubkey`, and [`Error::UnsupportedAddressType`] for script address types.
    pub fn new(
        address_type: AddressType,
        pubkey: PublicKey,
        privkey: Option<PrivateKey>,
    ) -> Result<Self> {
        let script_pubkey = key_script(address_type, &pubkey)
            .ok_or(Error::UnsupportedAddressType(address_type))?;

        ManagedAddress::with_script(address_type, script_pubkey, pubkey, privkey)
    }

    /// Creates a managed address with an explicit output script. This is how
    /// script, witness-script and taproot addresses are recorded.
    ///
    /// For key-hash address types `script_pubkey` must be the script derived
    /// from `pubkey`.
    pub fn with_script(
        address_type: AddressType,
        script_pubkey: ScriptBuf,
        pubkey: PublicKey,
        privkey: Option<PrivateKey>,
    ) -> Result<Self> {
        if let Some(privkey) = &privkey {
            if privkey.public_key(&Secp256k1::signing_only()) != pubkey {
                return Err(Error::KeyMismatch(format!(
                    "private key does not belong to public key {}",
                    pubkey
                )));
            }
        }

        if let Some(expected) = key_script(address_type, &pubkey) {
            if expected != script_pubkey {
                return Err(Error::KeyMismatch(format!(
                    "{:?} script {} is not derived from public key {}",
                    address_type,
                    hex::encode(script_pubkey.as_bytes()),
                    pubkey
                )));
            }
        }

        Ok(ManagedAddress {
            address_type,
            script_pubkey,
            pubkey,
            privkey,
        })
    }

    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    pub fn script_pubkey(&self) -> &Script {
        &self.script_pubkey
    }

    pub fn pubkey(&self) -> PublicKey {
        self.pubkey
    }

    pub fn is_watch_only(&self) -> bool {
        self.privkey.is_none()
    }

    /// Returns an owned copy of the private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyUnavailable`] for watch-only addresses.
    pub fn private_key(&self) -> Result<PrivateKey> {
        self.privkey.clone().ok_or_else(|| {
            Error::KeyUnavailable(format!(
                "address for script {} is watch-only",
                hex::encode(self.script_pubkey.as_bytes())
            ))
        })
    }

    /// The encoded address for this record on `network`.
    pub fn address(&self, network: Network) -> Result<Address> {
        Address::from_script(&self.script_pubkey, network.into())
            .map_err(|e| Error::InvalidScript(e.to_string()))
    }
}

/// Read access to the wallet's managed addresses.
pub trait KeyStore {
    /// Looks up the managed address that owns `script_pubkey`.
    ///
    /// The returned value is a snapshot; later changes to the store do not
    /// affect it.
    fn address_for_script(&self, script_pubkey: &Script) -> Option<ManagedAddress>;
}

impl<K: KeyStore + ?Sized> KeyStore for &K {
    fn address_for_script(&self, script_pubkey: &Script) -> Option<ManagedAddress> {
        (**self).address_for_script(script_pubkey)
    }
}

/// In-memory key store. Lookups take a read lock, imports a write lock.
#[derive(Debug, Default)]
pub struct MemoryKeyStore {
    addresses: RwLock<HashMap<ScriptBuf, ManagedAddress>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        MemoryKeyStore::default()
    }

    /// Imports a spendable key as an address of `address_type` and returns the
    /// output script it controls.
    pub fn import_private_key(
        &self,
        secret: SecretKey,
        address_type: AddressType,
    ) -> Result<ScriptBuf> {
        let secp = Secp256k1::signing_only();
        let pubkey = secret.public_key(&secp);

        self.insert(ManagedAddress::new(
            address_type,
            pubkey,
            Some(PrivateKey::new(secret)),
        )?)
    }

    /// Imports a watch-only address of `address_type` for `pubkey`.
    pub fn import_public_key(
        &self,
        pubkey: PublicKey,
        address_type: AddressType,
    ) -> Result<ScriptBuf> {
        self.insert(ManagedAddress::new(address_type, pubkey, None)?)
    }

    /// Imports an already built address, e.g. one from
    /// [`ManagedAddress::with_script`].
    pub fn import_address(&self, address: ManagedAddress) -> Result<ScriptBuf> {
        self.insert(address)
    }

    /// Removes the address owning `script_pubkey`. Returns whether one existed.
    pub fn remove(&self, script_pubkey: &Script) -> bool {
        self.addresses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(script_pubkey)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.addresses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, address: ManagedAddress) -> Result<ScriptBuf> {
        let script_pubkey = address.script_pubkey.clone();
        debug!(
            "importing {:?} address for script {}",
            address.address_type,
            hex::encode(script_pubkey.as_bytes())
        );

        self.addresses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(script_pubkey.clone(), address);

        Ok(script_pubkey)
    }
}

impl KeyStore for MemoryKeyStore {
    fn address_for_script(&self, script_pubkey: &Script) -> Option<ManagedAddress> {
        self.addresses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(script_pubkey)
            .cloned()
    }
}

/// The output script a single key controls, or `None` for address types that
/// are not derived from a key.
fn key_script(address_type: AddressType, pubkey: &PublicKey) -> Option<ScriptBuf> {
    let pubkey_hash = hash160::Hash::hash(&pubkey.serialize()).to_byte_array();

    match address_type {
        AddressType::PubKeyHash => Some(p2pkh_script(&pubkey_hash)),
        AddressType::WitnessPubKeyHash => Some(p2wpkh_script(&pubkey_hash)),
        AddressType::NestedWitnessPubKey => {
            let program = p2wpkh_script(&pubkey_hash);
            let script_hash = hash160::Hash::hash(program.as_bytes()).to_byte_array();
            Some(p2sh_script(&script_hash))
        }
        AddressType::Script | AddressType::WitnessScript | AddressType::Taproot => None,
    }
}

#[cfg(test)]
mod tests {
    use secp256k1::{Secp256k1, SecretKey};

    use super::*;

    fn secret(byte: u8) -> SecretKey {
        SecretKey::from_slice(&[byte; 32]).unwrap()
    }

    #[test]
    fn import_and_lookup() {
        let store = MemoryKeyStore::new();
        let spk = store
            .import_private_key(secret(1), AddressType::WitnessPubKeyHash)
            .unwrap();

        let addr = store.address_for_script(&spk).unwrap();
        assert_eq!(addr.address_type(), AddressType::WitnessPubKeyHash);
        assert_eq!(addr.script_pubkey(), spk.as_script());
        assert!(!addr.is_watch_only());
        assert_eq!(addr.private_key().unwrap().as_secret_key(), &secret(1));
    }

    #[test]
    fn nested_script_commits_to_witness_program() {
        let secp = Secp256k1::new();
        let store = MemoryKeyStore::new();
        let spk = store
            .import_private_key(secret(2), AddressType::NestedWitnessPubKey)
            .unwrap();

        let pubkey = secret(2).public_key(&secp);
        let pubkey_hash = hash160::Hash::hash(&pubkey.serialize()).to_byte_array();
        let program = p2wpkh_script(&pubkey_hash);
        let expected = p2sh_script(&hash160::Hash::hash(program.as_bytes()).to_byte_array());

        assert_eq!(spk, expected);
    }

    #[test]
    fn watch_only_has_no_private_key() {
        let secp = Secp256k1::new();
        let store = MemoryKeyStore::new();
        let spk = store
            .import_public_key(secret(3).public_key(&secp), AddressType::WitnessPubKeyHash)
            .unwrap();

        let addr = store.address_for_script(&spk).unwrap();
        assert!(addr.is_watch_only());
        match addr.private_key() {
            Err(Error::KeyUnavailable(_)) => (),
            other => panic!("expected KeyUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn script_types_cannot_be_imported_from_a_key() {
        let store = MemoryKeyStore::new();
        for address_type in [
            AddressType::Script,
            AddressType::WitnessScript,
            AddressType::Taproot,
        ] {
            match store.import_private_key(secret(4), address_type) {
                Err(Error::UnsupportedAddressType(t)) => assert_eq!(t, address_type),
                other => panic!("expected UnsupportedAddressType, got {:?}", other),
            }
        }
        assert!(store.is_empty());
    }

    #[test]
    fn mismatched_private_key_is_rejected() {
        let secp = Secp256k1::new();
        let res = ManagedAddress::new(
            AddressType::WitnessPubKeyHash,
            secret(7).public_key(&secp),
            Some(PrivateKey::new(secret(8))),
        );

        assert!(matches!(res, Err(Error::KeyMismatch(_))));
    }

    #[test]
    fn key_hash_script_must_derive_from_key() {
        let secp = Secp256k1::new();
        let pubkey = secret(9).public_key(&secp);
        let other = key_script(AddressType::WitnessPubKeyHash, &secret(10).public_key(&secp))
            .unwrap();

        let res = ManagedAddress::with_script(
            AddressType::WitnessPubKeyHash,
            other,
            pubkey,
            Some(PrivateKey::new(secret(9))),
        );
        assert!(matches!(res, Err(Error::KeyMismatch(_))));

        let own = key_script(AddressType::WitnessPubKeyHash, &pubkey).unwrap();
        let addr = ManagedAddress::with_script(
            AddressType::WitnessPubKeyHash,
            own.clone(),
            pubkey,
            Some(PrivateKey::new(secret(9))),
        )
        .unwrap();
        assert_eq!(addr.script_pubkey(), own.as_script());
    }

    #[test]
    fn script_types_carry_explicit_script() {
        let secp = Secp256k1::new();
        let store = MemoryKeyStore::new();
        let taproot = ScriptBuf::from_bytes([&[0x51, 0x20][..], &[0x42; 32][..]].concat());

        let addr = ManagedAddress::with_script(
            AddressType::Taproot,
            taproot.clone(),
            secret(11).public_key(&secp),
            Some(PrivateKey::new(secret(11))),
        )
        .unwrap();
        let spk = store.import_address(addr).unwrap();

        assert_eq!(spk, taproot);
        let addr = store.address_for_script(&taproot).unwrap();
        assert_eq!(addr.address_type(), AddressType::Taproot);
        assert!(!addr.is_watch_only());
    }

    #[test]
    fn remove_forgets_address() {
        let store = MemoryKeyStore::new();
        let spk = store
            .import_private_key(secret(5), AddressType::PubKeyHash)
            .unwrap();
        assert_eq!(store.len(), 1);

        assert!(store.remove(&spk));
        assert!(!store.remove(&spk));
        assert!(store.address_for_script(&spk).is_none());
    }

    #[test]
    fn encoded_addresses_match_network() {
        let store = MemoryKeyStore::new();
        let wpkh = store
            .import_private_key(secret(6), AddressType::WitnessPubKeyHash)
            .unwrap();
        let nested = store
            .import_private_key(secret(6), AddressType::NestedWitnessPubKey)
            .unwrap();

        let wpkh = store.address_for_script(&wpkh).unwrap();
        let nested = store.address_for_script(&nested).unwrap();

        assert!(wpkh.address(Network::Mainnet).unwrap().to_string().starts_with("bc1q"));
        assert!(wpkh.address(Network::Regtest).unwrap().to_string().starts_with("bcrt1q"));
        assert!(nested.address(Network::Mainnet).unwrap().to_string().starts_with('3'));
        assert!(nested.address(Network::Testnet).unwrap().to_string().starts_with('2'));
    }
}
