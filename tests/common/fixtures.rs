use std::str::FromStr;

use inputscript::bitcoin::absolute::LockTime;
use inputscript::bitcoin::transaction::Version;
use inputscript::bitcoin::{
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
};
use inputscript::secp256k1::SecretKey;
use inputscript::{AddressType, MemoryKeyStore};

pub const NATIVE_KEY: &str = "9d3a9c3bdbf4b4aa25f1da4f0dbd00bb3b6a6e1d3c2a8c4e0b7d0e3f7e5c1a11";
pub const NESTED_KEY: &str = "4b2f0c7e1a8d9e6f5c3b2a19087f6e5d4c3b2a1908f7e6d5c4b3a29180706f51";
pub const WATCH_ONLY_KEY: &str =
    "0f1e2d3c4b5a69788796a5b4c3d2e1f00f1e2d3c4b5a69788796a5b4c3d2e1f0";

pub const FUNDING_TXID: &str = "a9b9e18ab45fd7b9a6243a72972ced5af6aef816016c30576e525beda66bb498";

pub struct Wallet {
    pub store: MemoryKeyStore,
    pub native_spk: ScriptBuf,
    pub nested_spk: ScriptBuf,
    pub watch_only_spk: ScriptBuf,
}

pub fn secret(hex_str: &str) -> SecretKey {
    SecretKey::from_str(hex_str).unwrap()
}

pub fn wallet() -> Wallet {
    let secp = inputscript::secp256k1::Secp256k1::new();
    let store = MemoryKeyStore::new();

    let native_spk = store
        .import_private_key(secret(NATIVE_KEY), AddressType::WitnessPubKeyHash)
        .unwrap();
    let nested_spk = store
        .import_private_key(secret(NESTED_KEY), AddressType::NestedWitnessPubKey)
        .unwrap();
    let watch_only_spk = store
        .import_public_key(
            secret(WATCH_ONLY_KEY).public_key(&secp),
            AddressType::WitnessPubKeyHash,
        )
        .unwrap();

    Wallet {
        store,
        native_spk,
        nested_spk,
        watch_only_spk,
    }
}

pub fn prevout(script_pubkey: &ScriptBuf, sats: u64) -> TxOut {
    TxOut {
        value: Amount::from_sat(sats),
        script_pubkey: script_pubkey.clone(),
    }
}

/// An unsigned transaction with `inputs` inputs spending outputs of the
/// funding transaction, paying to a single p2wpkh output.
pub fn spending_tx(inputs: usize) -> Transaction {
    let funding = Txid::from_str(FUNDING_TXID).unwrap();

    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: (0..inputs as u32)
            .map(|vout| TxIn {
                previous_output: OutPoint::new(funding, vout),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::ENABLE_RBF_NO_LOCKTIME,
                witness: Witness::new(),
            })
            .collect(),
        output: vec![TxOut {
            value: Amount::from_sat(95_000),
            script_pubkey: ScriptBuf::from_hex("00143626f103c551124f501c8008d875e4d8a19b8d7e")
                .unwrap(),
        }],
    }
}
