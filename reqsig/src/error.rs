use thiserror::Error;

/// Result type for signed request verification
pub type ReqSigResult<T> = std::result::Result<T, ReqSigError>;

/// Error type for signed request verification.
/// Any of these must be handled as "not verified" by callers gating access on the result.
#[derive(Error, Debug)]
pub enum ReqSigError {
  /* ----- Signature header errors ----- */
  /// The `Signature` header is absent from the request
  #[error("Signature header not found: {0}")]
  HeaderNotFound(String),
  /// `headers` field is absent from the signature header value
  #[error("`headers` field is missing in the signature header")]
  HeadersFieldMissing,
  /// `signature` field is absent from the signature header value
  #[error("`signature` field is missing in the signature header")]
  SignatureFieldMissing,
  /// `keyId` field is absent from the signature header value
  #[error("`keyId` field is missing in the signature header")]
  KeyIdFieldMissing,

  /// A covered header value could not be taken as a string
  #[error("Invalid header value: {0}")]
  InvalidHeaderValue(String),

  /* ----- Crypto errors ----- */
  /// Invalid public key, including PEM decoding failures
  #[error("Failed to parse public key: {0}")]
  ParsePublicKeyError(String),

  /// Signature bytes could not be decoded or interpreted
  #[error("Failed to parse signature: {0}")]
  ParseSignatureError(String),

  /// Unknown key type name
  #[error("Invalid key type: {0}")]
  InvalidKeyType(String),
}

impl From<base64::DecodeError> for ReqSigError {
  fn from(e: base64::DecodeError) -> Self {
    ReqSigError::ParseSignatureError(format!("Base64 decode error: {e}"))
  }
}
