//! Private key handling for a single resolve call.
//!
//! A [`PrivateKey`] is an owned copy of a wallet secret. It is handed out by the
//! key store per call, moved through the optional tweak hook and dropped at the
//! end of the call, at which point the scalar is overwritten.
use core::fmt;

use bitcoin_hashes::{hash160, Hash};
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey, Signing};

use crate::Result;

/// Error type a tweak hook may return. It is carried verbatim in
/// [`Error::TweakFailed`](crate::Error::TweakFailed).
pub type TweakError = Box<dyn std::error::Error + Send + Sync>;

/// Callback that may replace the private key right before it is used to sign.
///
/// The hook receives the key that matches the on-chain address and returns the
/// key to sign with. It is invoked at most once per resolved input.
pub type PrivKeyTweaker<'a> =
    &'a dyn Fn(PrivateKey) -> std::result::Result<PrivateKey, TweakError>;

/// A secret key whose memory is erased when dropped.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SecretKey,
}

impl PrivateKey {
    pub fn new(inner: SecretKey) -> Self {
        PrivateKey { inner }
    }

    pub fn from_slice(data: &[u8]) -> Result<Self> {
        Ok(PrivateKey::new(SecretKey::from_slice(data)?))
    }

    /// `SecretKey` is `Copy`: copies taken from this reference are not erased
    /// when the `PrivateKey` is dropped.
    pub(crate) fn as_secret_key(&self) -> &SecretKey {
        &self.inner
    }

    pub fn public_key<C: Signing>(&self, secp: &Secp256k1<C>) -> PublicKey {
        self.inner.public_key(secp)
    }

    /// RIPEMD160(SHA256(compressed public key)).
    pub fn pubkey_hash<C: Signing>(&self, secp: &Secp256k1<C>) -> [u8; 20] {
        hash160::Hash::hash(&self.public_key(secp).serialize()).to_byte_array()
    }

    /// Returns `self + tweak` as a new key. `self` is consumed and erased.
    pub fn add_tweak(self, tweak: &Scalar) -> Result<Self> {
        Ok(PrivateKey::new(self.inner.add_tweak(tweak)?))
    }

    /// Returns `self * tweak` as a new key. `self` is consumed and erased.
    pub fn mul_tweak(self, tweak: &Scalar) -> Result<Self> {
        Ok(PrivateKey::new(self.inner.mul_tweak(tweak)?))
    }
}

impl From<SecretKey> for PrivateKey {
    fn from(inner: SecretKey) -> Self {
        PrivateKey::new(inner)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq(&other.inner)
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.inner.non_secure_erase();
    }
}
