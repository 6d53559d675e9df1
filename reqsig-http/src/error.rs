use reqsig::prelude::ReqSigError;
use thiserror::Error;

/// Result type for signed request verification over http requests
pub type HttpReqSigResult<T> = std::result::Result<T, HttpReqSigError>;

/// Error type for signed request verification over http requests
#[derive(Error, Debug)]
pub enum HttpReqSigError {
  /// `keyId` in the signature header is not the expected one
  #[error("Key id mismatch: expected `{expected}`, found `{found}`")]
  KeyIdMismatch { expected: String, found: String },

  /// Inherited from ReqSigError
  #[error("ReqSigError: {0}")]
  ReqSigError(#[from] ReqSigError),
}
