mod asymmetric;

use crate::error::{ReqSigError, ReqSigResult};

pub use asymmetric::{KeyClassification, PublicKey, CURVE25519_KEY_LEN, CURVE25519_PEM_PREFIX_LEN, MIN_RSA_KEY_BITS};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Key types accepted for signed requests
pub enum KeyType {
  /// RSA public key of at least 2048 bits
  Rsa2048,
  /// Curve25519 signing (Ed25519) public key
  Curve25519,
}

impl KeyType {
  pub fn as_str(&self) -> &'static str {
    match self {
      KeyType::Rsa2048 => "rsa-2048",
      KeyType::Curve25519 => "curve25519",
    }
  }
}

impl std::fmt::Display for KeyType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl core::str::FromStr for KeyType {
  type Err = ReqSigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "rsa-2048" => Ok(Self::Rsa2048),
      "curve25519" => Ok(Self::Curve25519),
      _ => Err(ReqSigError::InvalidKeyType(s.to_string())),
    }
  }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
/// Signature scheme applied to RSA keys
pub enum RsaScheme {
  /// RSASSA-PSS with SHA-256, salt length equal to the digest length
  #[default]
  PssSha256,
  /// RSASSA-PKCS1-v1_5 with SHA-256
  Pkcs1v15Sha256,
}

/// VerifyingKey trait
pub trait VerifyingKey {
  /// Verify the signature over data.
  /// Returns `Ok(false)` for a well-formed signature that does not match, and an error only when the signature
  /// bytes cannot be interpreted at all.
  fn verify(&self, data: &[u8], signature: &[u8], rsa_scheme: RsaScheme) -> ReqSigResult<bool>;
  fn key_type(&self) -> KeyType;
}
