//! Resolver configuration.
#[cfg(feature = "serde")]
use std::{fs, path::Path};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Error;

/// The network the wallet operates on. Only affects address rendering.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Signet,
    Regtest,
}

impl From<Network> for &str {
    fn from(value: Network) -> Self {
        match value {
            Network::Mainnet => "bitcoin", // we use the same string as rust-bitcoin for compatibility
            Network::Testnet => "testnet",
            Network::Signet => "signet",
            Network::Regtest => "regtest",
        }
    }
}

impl From<Network> for String {
    fn from(value: Network) -> Self {
        <&str>::from(value).to_owned()
    }
}

impl TryFrom<&str> for Network {
    type Error = Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let res = match value {
            "bitcoin" | "main" => Self::Mainnet, // We also take the core style argument
            "testnet" | "test" => Self::Testnet,
            "signet" => Self::Signet,
            "regtest" => Self::Regtest,
            _ => return Err(Error::InvalidNetwork(value.to_string())),
        };
        Ok(res)
    }
}

impl TryFrom<String> for Network {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.as_str().try_into()
    }
}

impl From<Network> for bitcoin::Network {
    fn from(value: Network) -> Self {
        match value {
            Network::Mainnet => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
            Network::Signet => bitcoin::Network::Signet,
            Network::Regtest => bitcoin::Network::Regtest,
        }
    }
}

/// Settings for a [`Resolver`](crate::Resolver).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolverConfig {
    pub network: Network,
    /// Grind ECDSA nonces until the signature's R value is below 2^255,
    /// saving one byte of witness data on average.
    pub low_r_signatures: bool,
    /// Check every produced input script against the spent output before
    /// returning it.
    pub verify_signatures: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            network: Network::Mainnet,
            low_r_signatures: true,
            verify_signatures: false,
        }
    }
}

#[cfg(feature = "serde")]
impl ResolverConfig {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let contents = fs::read_to_string(path)?;
        ResolverConfig::from_json(&contents)
    }
}
