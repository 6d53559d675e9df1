use super::{KeyType, RsaScheme};
use crate::{
  error::{ReqSigError, ReqSigResult},
  trace::*,
};
use ed25519_compact::PublicKey as Ed25519PublicKey;
use pkcs8::der::{pem, Decode};
use rsa::{pkcs1::DecodeRsaPublicKey, pkcs8::DecodePublicKey, traits::PublicKeyParts, Pkcs1v15Sign, Pss, RsaPublicKey};
use sha2::{Digest, Sha256};
use spki::SubjectPublicKeyInfoRef;

/// Number of bytes prefixed to the raw Curve25519 key in its DER representation
pub const CURVE25519_PEM_PREFIX_LEN: usize = 12;
/// Number of bytes of a raw Curve25519 public key
pub const CURVE25519_KEY_LEN: usize = 32;
/// Smallest accepted RSA modulus
pub const MIN_RSA_KEY_BITS: usize = 2048;

/// PEM label of a PKCS#1 `RSAPublicKey`
const RSA_PUBLIC_KEY_PEM_LABEL: &str = "RSA PUBLIC KEY";

#[allow(non_upper_case_globals, dead_code)]
/// Algorithm OIDs
mod algorithm_oids {
  /// OID for `rsaEncryption`
  pub const RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";
  /// OID for `id-Ed25519`
  pub const Ed25519: &str = "1.3.101.112";
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
/// How the key family of a PEM document is determined
pub enum KeyClassification {
  /// Decoded bodies longer than `CURVE25519_PEM_PREFIX_LEN + CURVE25519_KEY_LEN` bytes are RSA keys, the rest are
  /// Curve25519 keys whose first `CURVE25519_PEM_PREFIX_LEN` bytes are skipped.
  /// The algorithm identifier is never looked at.
  #[default]
  ByteLength,
  /// The `SubjectPublicKeyInfo` algorithm identifier decides the key family.
  /// `RSA PUBLIC KEY` (PKCS#1) documents carry no identifier and are read as RSA.
  AlgorithmIdentifier,
}

/* -------------------------------- */
#[derive(Debug, Clone)]
/// Public key verifying signed requests
pub enum PublicKey {
  /// RSA, 2048 bits or more
  Rsa2048(RsaPublicKey),
  /// Curve25519 signing key (Ed25519)
  Curve25519(Ed25519PublicKey),
}

impl PublicKey {
  /// Classify and parse a PEM encoded public key by the length of its decoded body
  pub fn from_pem(pem: &str) -> ReqSigResult<Self> {
    Self::from_pem_with(pem, KeyClassification::ByteLength)
  }

  /// Classify and parse a PEM encoded public key in the given classification mode.
  /// Whitespace around the armor is ignored.
  pub fn from_pem_with(pem: &str, classification: KeyClassification) -> ReqSigResult<Self> {
    let (label, der) = pem::decode_vec(pem.trim().as_bytes())
      .map_err(|e| ReqSigError::ParsePublicKeyError(format!("Error decoding PEM: {e}")))?;

    let pk = match classification {
      KeyClassification::ByteLength => Self::from_der_by_length(label, &der)?,
      KeyClassification::AlgorithmIdentifier => Self::from_der_by_algorithm(label, &der)?,
    };
    debug!("Read {} public key ({} bits)", pk.key_type(), pk.key_size_bits());
    Ok(pk)
  }

  fn from_der_by_length(label: &str, der: &[u8]) -> ReqSigResult<Self> {
    if der.len() > CURVE25519_PEM_PREFIX_LEN + CURVE25519_KEY_LEN {
      return Ok(Self::Rsa2048(parse_rsa_public_key(label, der)?));
    }
    let raw = der.get(CURVE25519_PEM_PREFIX_LEN..).ok_or_else(|| {
      ReqSigError::ParsePublicKeyError(format!(
        "Key body of {} bytes is shorter than the {CURVE25519_PEM_PREFIX_LEN}-byte prefix",
        der.len()
      ))
    })?;
    Ok(Self::Curve25519(parse_curve25519_public_key(raw)?))
  }

  fn from_der_by_algorithm(label: &str, der: &[u8]) -> ReqSigResult<Self> {
    if label == RSA_PUBLIC_KEY_PEM_LABEL {
      return Ok(Self::Rsa2048(parse_rsa_public_key(label, der)?));
    }

    let spki_ref = SubjectPublicKeyInfoRef::from_der(der)
      .map_err(|e| ReqSigError::ParsePublicKeyError(format!("Error decoding SubjectPublicKeyInfo: {e}")))?;
    match spki_ref.algorithm.oid.to_string().as_ref() {
      algorithm_oids::RSA_ENCRYPTION => Ok(Self::Rsa2048(parse_rsa_public_key(label, der)?)),
      algorithm_oids::Ed25519 => {
        let public_key = spki_ref
          .subject_public_key
          .as_bytes()
          .ok_or(ReqSigError::ParsePublicKeyError("Invalid public key".to_string()))?;
        Ok(Self::Curve25519(parse_curve25519_public_key(public_key)?))
      }
      oid => Err(ReqSigError::ParsePublicKeyError(format!("Unsupported algorithm: {oid}"))),
    }
  }

  /// Size of the key in bits
  pub fn key_size_bits(&self) -> usize {
    match self {
      Self::Rsa2048(pk) => pk.n().bits(),
      Self::Curve25519(_) => CURVE25519_KEY_LEN * 8,
    }
  }

  /// SHA-256 fingerprint of the raw key material in base64url without padding.
  /// RSA keys are hashed over the big-endian modulus followed by the big-endian exponent.
  pub fn fingerprint(&self) -> String {
    use base64::{engine::general_purpose, Engine as _};

    let bytes = match self {
      Self::Rsa2048(pk) => [pk.n().to_bytes_be(), pk.e().to_bytes_be()].concat(),
      Self::Curve25519(pk) => pk.as_ref().to_vec(),
    };
    let mut hasher = <Sha256 as Digest>::new();
    hasher.update(&bytes);
    let hash = hasher.finalize();
    general_purpose::URL_SAFE_NO_PAD.encode(hash)
  }
}

/// Parse RSA public key material, PKCS#1 if labelled so and SubjectPublicKeyInfo otherwise
fn parse_rsa_public_key(label: &str, der: &[u8]) -> ReqSigResult<RsaPublicKey> {
  let pk = if label == RSA_PUBLIC_KEY_PEM_LABEL {
    RsaPublicKey::from_pkcs1_der(der)
      .map_err(|e| ReqSigError::ParsePublicKeyError(format!("Error decoding RSAPublicKey: {e}")))?
  } else {
    RsaPublicKey::from_public_key_der(der)
      .map_err(|e| ReqSigError::ParsePublicKeyError(format!("Error decoding RSA SubjectPublicKeyInfo: {e}")))?
  };
  let bits = pk.n().bits();
  if bits < MIN_RSA_KEY_BITS {
    return Err(ReqSigError::ParsePublicKeyError(format!(
      "RSA key of {bits} bits is smaller than {MIN_RSA_KEY_BITS} bits"
    )));
  }
  Ok(pk)
}

/// Parse a raw Curve25519 public key
fn parse_curve25519_public_key(raw: &[u8]) -> ReqSigResult<Ed25519PublicKey> {
  if raw.len() != CURVE25519_KEY_LEN {
    return Err(ReqSigError::ParsePublicKeyError(format!(
      "Curve25519 key must be {CURVE25519_KEY_LEN} bytes, got {}",
      raw.len()
    )));
  }
  Ed25519PublicKey::from_slice(raw).map_err(|e| ReqSigError::ParsePublicKeyError(e.to_string()))
}

impl super::VerifyingKey for PublicKey {
  /// Verify signature
  fn verify(&self, data: &[u8], signature: &[u8], rsa_scheme: RsaScheme) -> ReqSigResult<bool> {
    match self {
      Self::Rsa2048(pk) => {
        if signature.len() != pk.size() {
          return Err(ReqSigError::ParseSignatureError(format!(
            "RSA signature must be {} bytes, got {}",
            pk.size(),
            signature.len()
          )));
        }
        let hashed = Sha256::digest(data);
        let res = match rsa_scheme {
          RsaScheme::PssSha256 => pk.verify(Pss::new::<Sha256>(), &hashed, signature),
          RsaScheme::Pkcs1v15Sha256 => pk.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature),
        };
        if let Err(e) = &res {
          debug!("RSA signature mismatch ({rsa_scheme:?}): {e}");
        }
        Ok(res.is_ok())
      }
      Self::Curve25519(pk) => {
        let sig =
          ed25519_compact::Signature::from_slice(signature).map_err(|e| ReqSigError::ParseSignatureError(e.to_string()))?;
        match pk.verify(data, &sig) {
          Ok(()) => Ok(true),
          Err(e) => {
            debug!("Curve25519 signature mismatch: {e}");
            Ok(false)
          }
        }
      }
    }
  }

  fn key_type(&self) -> KeyType {
    match self {
      Self::Rsa2048(_) => KeyType::Rsa2048,
      Self::Curve25519(_) => KeyType::Curve25519,
    }
  }
}

impl PublicKey {
  /// Key family of this key
  pub fn key_type(&self) -> KeyType {
    super::VerifyingKey::key_type(self)
  }
}

#[cfg(test)]
mod tests {
  use super::super::VerifyingKey;
  use super::*;
  use base64::{engine::general_purpose, Engine as _};
  use std::matches;

  const RSA_PUBLIC_KEY: &str = r##"-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAnLpc4dBMuGj54SQz+rpX
8zpNySsNd1i6CNCPfOd+71+/70GYZd1Vz4NmR2VZGfpWTBiPrUyZk/C2NtgabDk1
GxPKnhI+utZLEWj5R8ScjQXkquC9DzmGF/IH8N6mWDy93mjokKjxKkihfDDAelvB
hWq/iJ6O30foU1fF4jYXsZ/R9cTmaNDz7KBqrfuD19mZcK7Lq4Ph1tKUocLAXHs4
YNrTOKwpxLR9+WQHXMS/Ur79LISWwz0urPBH7pp+dQzRNQDP3F7sXj7HK6S7h7FJ
IPu2w2rqFDaPnmaRUoOTLVBM99kT6SuVjHOa4Vk/TlNqIjyEHczFMmJfY6n4yGog
pwIDAQAB
-----END PUBLIC KEY-----
"##;
  const RSA_PKCS1_PUBLIC_KEY: &str = r##"-----BEGIN RSA PUBLIC KEY-----
MIIBCgKCAQEAnLpc4dBMuGj54SQz+rpX8zpNySsNd1i6CNCPfOd+71+/70GYZd1V
z4NmR2VZGfpWTBiPrUyZk/C2NtgabDk1GxPKnhI+utZLEWj5R8ScjQXkquC9DzmG
F/IH8N6mWDy93mjokKjxKkihfDDAelvBhWq/iJ6O30foU1fF4jYXsZ/R9cTmaNDz
7KBqrfuD19mZcK7Lq4Ph1tKUocLAXHs4YNrTOKwpxLR9+WQHXMS/Ur79LISWwz0u
rPBH7pp+dQzRNQDP3F7sXj7HK6S7h7FJIPu2w2rqFDaPnmaRUoOTLVBM99kT6SuV
jHOa4Vk/TlNqIjyEHczFMmJfY6n4yGogpwIDAQAB
-----END RSA PUBLIC KEY-----
"##;
  const RSA_1024_PUBLIC_KEY: &str = r##"-----BEGIN PUBLIC KEY-----
MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQDKKHSRIK+vjBbM918hNEEOd/42
h9vxmcacFVt9ODuT0m0+Jjht9DuJdYId1xH25fsWUynw8iYzn1GLi424RCdn2ClW
vMBcyTMhKBv7/9fKoICOera2Tqk8kCr9tvwQJv+UwWFetOD1yWXLKqN+sDadqugf
Dow/dHVK67qNmgMthwIDAQAB
-----END PUBLIC KEY-----
"##;
  const EDDSA_PUBLIC_KEY: &str = r##"-----BEGIN PUBLIC KEY-----
MCowBQYDK2VwAyEAiwH2gJTRe/uAHGs52iqBspMOL+I0OaRuBjVg/5cib2Y=
-----END PUBLIC KEY-----
"##;
  // X25519 algorithm identifier in front of the raw key, accepted by length alone
  const X25519_LABELLED_PUBLIC_KEY: &str =
    "-----BEGIN PUBLIC KEY-----\nMCowBQYDK2VuAyEAtV5dzF+zZV9Yup+riEAqaCNol/JumbAPjrT6CkEdpGg=\n-----END PUBLIC KEY-----\n";
  // 12-byte prefix followed by only 20 bytes
  const SHORT_CURVE25519_PUBLIC_KEY: &str =
    "-----BEGIN PUBLIC KEY-----\nMCowBQYDK2VwAyEAAAECAwQFBgcICQoLDA0ODxAREhM=\n-----END PUBLIC KEY-----\n";
  const TINY_PUBLIC_KEY: &str = "-----BEGIN PUBLIC KEY-----\nMAMCAQE=\n-----END PUBLIC KEY-----\n";
  // 48 zero bytes, long enough to be taken as rsa but no DER at all
  const NOT_DER_PUBLIC_KEY: &str =
    "-----BEGIN PUBLIC KEY-----\nAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA\n-----END PUBLIC KEY-----\n";
  // first 48 bytes of a SubjectPublicKeyInfo in a PKCS#1 armor
  const TRUNCATED_RSA_PUBLIC_KEY: &str = r##"-----BEGIN RSA PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAnLpc4dBMuGj54SQz+rpX
-----END RSA PUBLIC KEY-----
"##;
  // indented armor as pasted from a config file
  const INDENTED_RSA_PUBLIC_KEY: &str = r##"    -----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAtV8LJAscsGgAgtUsR1Tx
0rcgqw8178DKu67F76dmWVQB1MLdDmyrAZv6XNrpqikMaZfjzdUERn14phBtPw+Z
RFl7IUFyOYWUqOLJKN1d7YKK1cMg2fQEndL6kBg6sB/Ipp1YNwr/H82OsbriAznu
n/q5OgMAZ3E0zu0nIwonNykI5NrE+yoe6KSa3Cy4QWpqTZJ1BeW29ZsJUzmM4hfE
s3M/hRmh44o8NJ/9hY9UsoItMXrV4C76o25DG1mOsR/GqpMVXVBQzxez7GS2Yo+6
AlMsxgaoPbMrVe5o2fbnhT7yBrdAnt0XFaofxiSau4n9xfjRmB2edIuevh+kfGpR
aQIDAQAB
-----END PUBLIC KEY-----"##;

  const SIGNING_STRING: &str = "example.comTue, 01 Jan 2030 00:00:00 GMT";
  const RSA_PSS_SIGNATURE: &str = "liq9A4lJVcTCda4ItXqc6uxOW78+BQywgvFVAWxhMSxZTDpYUncKVIJMkeG5IoV1Bv6UiU/SYWVaj30F+gn04Yyeg0OraC2HRNlIN6Tv7axCgdqRzC+foyWAFNPirT9MUhNWrgHzMnuiFdPY+RX+NIDtYXgvaBvwTXpUpYUc5D3oBk4uc5s4xMKLCTIo3+fIuKQYZEXpIPTwecgGJ10HFJysPaFAaLgyk+wpNZJoDyZpEVmwcT2FCcQwr1NCFptv/jdyMt9rOrvnnNbwm/Zpt286V58vltPgWjsJjvDIHIYguhfoNDt6nLfyG7vB8nCDwsB/ZxQWnrqgTSNP7qtESQ==";
  const RSA_PKCS1V15_SIGNATURE: &str = "FvQTXs1YmIwMDpyvgnxaOTnRBkIFJwywRfvVAGL1fZbFYnOVwH/DElzxV2+XUzMP1L38IqRYsoygm3/hDZZvYOEFuVlmLkloGC3DgDlsMoTlS57Uhfs9E2CvoHahA11c0RVtdZPdEPL8SkrpZW+u3GePF/jNivyYG1cEQ4WQ03uGmBW9ekMyUe0nOw3xHH3342k3qGqGCrlaVR781WD2b6SDd55kZwAAzoMz8QGFIh7I34Qht+Jfq9kKHHftR/g2gFrO8rzQVL3RphqR8/H8LRs13rV3riQnHc69jER7JaDZDasD/ojxGYWDEZmjcLq1UedWX5bgBy3AmszU/9k0Rg==";
  const EDDSA_SIGNATURE: &str = "p/boqdZRqTS3IW6NzieB/aXhUsPxhAp+CgsO4l+hMPlFxUXoa0wgZU9UBqxNPkLZjY+gwd2qkYMtcuUuou6mCA==";

  fn decode(b64: &str) -> Vec<u8> {
    general_purpose::STANDARD.decode(b64).unwrap()
  }

  #[test]
  fn test_from_pem() {
    let pk = PublicKey::from_pem(RSA_PUBLIC_KEY).unwrap();
    assert!(matches!(pk, PublicKey::Rsa2048(_)));
    assert_eq!(pk.key_type(), KeyType::Rsa2048);
    assert_eq!(pk.key_size_bits(), 2048);

    let pk = PublicKey::from_pem(RSA_PKCS1_PUBLIC_KEY).unwrap();
    assert!(matches!(pk, PublicKey::Rsa2048(_)));

    let pk = PublicKey::from_pem(EDDSA_PUBLIC_KEY).unwrap();
    assert!(matches!(pk, PublicKey::Curve25519(_)));
    assert_eq!(pk.key_type(), KeyType::Curve25519);
    assert_eq!(pk.key_size_bits(), 256);

    let pk = PublicKey::from_pem(X25519_LABELLED_PUBLIC_KEY).unwrap();
    assert!(matches!(pk, PublicKey::Curve25519(_)));
  }

  #[test]
  fn test_from_indented_pem() {
    let pk = PublicKey::from_pem(INDENTED_RSA_PUBLIC_KEY).unwrap();
    assert_eq!(pk.key_type(), KeyType::Rsa2048);
    assert_eq!(pk.key_size_bits(), 2048);

    let padded = format!("\n  {}  \n", EDDSA_PUBLIC_KEY);
    let pk = PublicKey::from_pem(&padded).unwrap();
    assert_eq!(pk.key_type(), KeyType::Curve25519);
  }

  #[test]
  fn test_from_pem_by_algorithm_identifier() {
    let pk = PublicKey::from_pem_with(RSA_PUBLIC_KEY, KeyClassification::AlgorithmIdentifier).unwrap();
    assert!(matches!(pk, PublicKey::Rsa2048(_)));
    let pk = PublicKey::from_pem_with(RSA_PKCS1_PUBLIC_KEY, KeyClassification::AlgorithmIdentifier).unwrap();
    assert!(matches!(pk, PublicKey::Rsa2048(_)));
    let pk = PublicKey::from_pem_with(EDDSA_PUBLIC_KEY, KeyClassification::AlgorithmIdentifier).unwrap();
    assert!(matches!(pk, PublicKey::Curve25519(_)));

    let res = PublicKey::from_pem_with(X25519_LABELLED_PUBLIC_KEY, KeyClassification::AlgorithmIdentifier);
    assert!(matches!(res, Err(ReqSigError::ParsePublicKeyError(_))));
  }

  #[test]
  fn test_from_bad_pem() {
    for bad in [
      "some random string",
      "-----BEGIN PUBLIC KEY-----\nsome stuff\n-----END PUBLIC KEY-----",
      SHORT_CURVE25519_PUBLIC_KEY,
      TINY_PUBLIC_KEY,
      NOT_DER_PUBLIC_KEY,
      TRUNCATED_RSA_PUBLIC_KEY,
      RSA_1024_PUBLIC_KEY,
    ] {
      let res = PublicKey::from_pem(bad);
      assert!(matches!(res, Err(ReqSigError::ParsePublicKeyError(_))), "{bad}");
    }
  }

  #[test]
  fn test_verify_rsa() {
    let pk = PublicKey::from_pem(RSA_PUBLIC_KEY).unwrap();
    let data = SIGNING_STRING.as_bytes();

    let signature = decode(RSA_PSS_SIGNATURE);
    assert!(pk.verify(data, &signature, RsaScheme::PssSha256).unwrap());
    assert!(!pk.verify(b"example.org", &signature, RsaScheme::PssSha256).unwrap());
    assert!(!pk.verify(data, &signature, RsaScheme::Pkcs1v15Sha256).unwrap());

    let signature = decode(RSA_PKCS1V15_SIGNATURE);
    assert!(pk.verify(data, &signature, RsaScheme::Pkcs1v15Sha256).unwrap());
    assert!(!pk.verify(data, &signature, RsaScheme::PssSha256).unwrap());

    let pk = PublicKey::from_pem(RSA_PKCS1_PUBLIC_KEY).unwrap();
    assert!(pk.verify(data, &signature, RsaScheme::Pkcs1v15Sha256).unwrap());
  }

  #[test]
  fn test_verify_rsa_tampered_signature() {
    let pk = PublicKey::from_pem(RSA_PUBLIC_KEY).unwrap();
    let data = SIGNING_STRING.as_bytes();
    let signature = decode(RSA_PSS_SIGNATURE);

    for idx in [0, 100, signature.len() - 1] {
      let mut tampered = signature.clone();
      tampered[idx] ^= 0x01;
      assert!(!pk.verify(data, &tampered, RsaScheme::PssSha256).unwrap());
    }

    let res = pk.verify(data, &signature[1..], RsaScheme::PssSha256);
    assert!(matches!(res, Err(ReqSigError::ParseSignatureError(_))));
    let res = pk.verify(data, &[], RsaScheme::PssSha256);
    assert!(matches!(res, Err(ReqSigError::ParseSignatureError(_))));
  }

  #[test]
  fn test_verify_curve25519() {
    let pk = PublicKey::from_pem(EDDSA_PUBLIC_KEY).unwrap();
    let data = SIGNING_STRING.as_bytes();
    let signature = decode(EDDSA_SIGNATURE);
    // scheme only applies to rsa keys
    assert!(pk.verify(data, &signature, RsaScheme::PssSha256).unwrap());
    assert!(pk.verify(data, &signature, RsaScheme::Pkcs1v15Sha256).unwrap());
    assert!(!pk.verify(b"example.org", &signature, RsaScheme::PssSha256).unwrap());

    let mut tampered = signature.clone();
    tampered[10] ^= 0x80;
    assert!(!pk.verify(data, &tampered, RsaScheme::PssSha256).unwrap());

    let res = pk.verify(data, &signature[..63], RsaScheme::PssSha256);
    assert!(matches!(res, Err(ReqSigError::ParseSignatureError(_))));
  }

  #[test]
  fn test_fingerprint() {
    let spki = PublicKey::from_pem(RSA_PUBLIC_KEY).unwrap();
    let pkcs1 = PublicKey::from_pem(RSA_PKCS1_PUBLIC_KEY).unwrap();
    assert_eq!(spki.fingerprint(), pkcs1.fingerprint());

    let ed = PublicKey::from_pem(EDDSA_PUBLIC_KEY).unwrap();
    assert_ne!(ed.fingerprint(), spki.fingerprint());
    assert_eq!(ed.fingerprint().len(), 43);
  }
}
