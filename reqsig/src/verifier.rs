use crate::{
  crypto::{KeyClassification, PublicKey, RsaScheme, VerifyingKey},
  error::{ReqSigError, ReqSigResult},
  request_headers::RequestHeaders,
  signature_header::SignatureHeaderFields,
  signing_string::{Canonicalization, SigningString},
  trace::*,
};
use base64::{engine::general_purpose, Engine as _};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
/// How the `signature` field value is turned into signature bytes
pub enum SignatureEncoding {
  /// Standard base64 with padding
  #[default]
  Base64,
  /// UTF-8 bytes of the field value as is
  Raw,
}

impl SignatureEncoding {
  /// Decode the signature field value
  pub fn decode(&self, signature_value: &str) -> ReqSigResult<Vec<u8>> {
    match self {
      Self::Base64 => Ok(general_purpose::STANDARD.decode(signature_value)?),
      Self::Raw => Ok(signature_value.as_bytes().to_vec()),
    }
  }
}

/* ---------------------------------------- */
#[derive(Debug, Clone, Default)]
/// Options of signed request verification. Defaults follow the de facto behavior of existing senders.
pub struct VerifierConfig {
  /// how the PEM key is classified
  pub classification: KeyClassification,
  /// how the signing string is assembled
  pub canonicalization: Canonicalization,
  /// how the signature field is decoded
  pub signature_encoding: SignatureEncoding,
  /// signature scheme for RSA keys
  pub rsa_scheme: RsaScheme,
}

impl VerifierConfig {
  /// Set key classification mode
  pub fn set_classification(&mut self, classification: KeyClassification) -> &mut Self {
    self.classification = classification;
    self
  }

  /// Set signing string canonicalization
  pub fn set_canonicalization(&mut self, canonicalization: Canonicalization) -> &mut Self {
    self.canonicalization = canonicalization;
    self
  }

  /// Set signature field encoding
  pub fn set_signature_encoding(&mut self, signature_encoding: SignatureEncoding) -> &mut Self {
    self.signature_encoding = signature_encoding;
    self
  }

  /// Set RSA signature scheme
  pub fn set_rsa_scheme(&mut self, rsa_scheme: RsaScheme) -> &mut Self {
    self.rsa_scheme = rsa_scheme;
    self
  }
}

/* ---------------------------------------- */
#[derive(Debug, Clone)]
/// Verifier of signed requests bound to a single public key.
/// Build it once per key and share it across requests.
pub struct SignedRequestVerifier<K = PublicKey> {
  key: K,
  config: VerifierConfig,
}

impl SignedRequestVerifier<PublicKey> {
  /// Create a verifier from a PEM encoded public key with default options
  pub fn from_pem(pem: &str) -> ReqSigResult<Self> {
    Self::from_pem_with_config(pem, VerifierConfig::default())
  }

  /// Create a verifier from a PEM encoded public key with the given options
  pub fn from_pem_with_config(pem: &str, config: VerifierConfig) -> ReqSigResult<Self> {
    let key = PublicKey::from_pem_with(pem, config.classification)?;
    Ok(Self { key, config })
  }
}

impl<K> SignedRequestVerifier<K>
where
  K: VerifyingKey,
{
  /// Create a verifier from an already parsed key
  pub fn new(key: K, config: VerifierConfig) -> Self {
    Self { key, config }
  }

  pub fn public_key(&self) -> &K {
    &self.key
  }

  pub fn config(&self) -> &VerifierConfig {
    &self.config
  }

  /// Verify the signature carried in the `Signature` header of the given request headers.
  /// `Ok(false)` means a well-formed but wrong signature. Errors are never to be taken as verified.
  pub fn verify_headers<H>(&self, headers: &H) -> ReqSigResult<bool>
  where
    H: RequestHeaders + ?Sized,
  {
    let fields = SignatureHeaderFields::from_headers(headers)?;
    self.verify_fields(&fields, headers)
  }

  /// Verify already parsed signature header fields against the request headers
  pub fn verify_fields<H>(&self, fields: &SignatureHeaderFields, headers: &H) -> ReqSigResult<bool>
  where
    H: RequestHeaders + ?Sized,
  {
    if !fields.is_structurally_valid() {
      warn!("Signature header of key `{}` covers no header or has no signature", fields.key_id);
      return Ok(false);
    }
    let signing_string = SigningString::build_with(fields, headers, self.config.canonicalization)?;
    let signature = self.config.signature_encoding.decode(&fields.signature_value)?;

    let verified = self
      .key
      .verify(signing_string.as_bytes(), &signature, self.config.rsa_scheme)?;
    debug!(
      "Signature of key `{}` ({}) verified: {verified}",
      fields.key_id,
      self.key.key_type()
    );
    Ok(verified)
  }

  /// Verify raw signature bytes over a signing string
  pub fn verify_signing_string(&self, signing_string: &SigningString, signature: &[u8]) -> ReqSigResult<bool> {
    self
      .key
      .verify(signing_string.as_bytes(), signature, self.config.rsa_scheme)
  }
}

impl std::str::FromStr for SignedRequestVerifier<PublicKey> {
  type Err = ReqSigError;

  fn from_str(pem: &str) -> Result<Self, Self::Err> {
    Self::from_pem(pem)
  }
}
