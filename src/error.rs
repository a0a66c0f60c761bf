use std::fmt;

use crate::keys::TweakError;
use crate::keystore::AddressType;

#[derive(Debug)]
pub enum Error {
    UnknownOutput(String),
    KeyUnavailable(String),
    KeyMismatch(String),
    UnsupportedAddressType(AddressType),
    TweakFailed(TweakError),
    SigningFailed(String),
    InvalidInputIndex { index: usize, inputs: usize },
    PrevoutMismatch { inputs: usize, prevouts: usize },
    VerificationFailed(String),
    InvalidScript(String),
    InvalidNetwork(String),
    InvalidConfig(String),
    Secp256k1Error(secp256k1::Error),
    IOError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::UnknownOutput(script) => {
                write!(f, "no wallet address controls output script {}", script)
            }
            Error::KeyUnavailable(msg) => write!(f, "private key unavailable: {}", msg),
            Error::KeyMismatch(msg) => write!(f, "key does not match script: {}", msg),
            Error::UnsupportedAddressType(t) => {
                write!(f, "unsupported address type for input script: {:?}", t)
            }
            Error::TweakFailed(e) => write!(f, "private key tweak failed: {}", e),
            Error::SigningFailed(msg) => write!(f, "signing failed: {}", msg),
            Error::InvalidInputIndex { index, inputs } => write!(
                f,
                "input index {} out of range for transaction with {} inputs",
                index, inputs
            ),
            Error::PrevoutMismatch { inputs, prevouts } => write!(
                f,
                "transaction has {} inputs but {} previous outputs were given",
                inputs, prevouts
            ),
            Error::VerificationFailed(msg) => write!(f, "verification failed: {}", msg),
            Error::InvalidScript(msg) => write!(f, "{}", msg),
            Error::InvalidNetwork(msg) => write!(f, "Invalid network: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            Error::Secp256k1Error(e) => e.fmt(f),
            Error::IOError(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::TweakFailed(e) => Some(e.as_ref()),
            Error::Secp256k1Error(e) => Some(e),
            Error::IOError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<secp256k1::Error> for Error {
    fn from(e: secp256k1::Error) -> Self {
        Error::Secp256k1Error(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IOError(e)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}
