//! # reqsig
//!
//! Verification of signed HTTP requests carrying a `Signature` header of the form
//! `keyId="<id>",headers="<space separated header names>",signature="<value>"`.
//!
//! A verification runs four steps, each usable on its own:
//!
//! 1. [`PublicKey::from_pem`](prelude::PublicKey::from_pem) classifies a PEM public key as RSA or Curve25519.
//! 2. [`SignatureHeaderFields::parse`](prelude::SignatureHeaderFields::parse) splits the header value into its fields.
//! 3. [`SigningString::build`](prelude::SigningString::build) rebuilds the signed bytes from the covered headers.
//! 4. [`VerifyingKey::verify`](prelude::VerifyingKey::verify) checks the signature with the primitive of the key type.
//!
//! [`SignedRequestVerifier`](prelude::SignedRequestVerifier) chains them for a request given as a header map.

mod crypto;
mod error;
mod request_headers;
mod signature_header;
mod signing_string;
mod trace;
mod util;
mod verifier;

pub mod prelude {
  pub use crate::{
    crypto::{
      KeyClassification, KeyType, PublicKey, RsaScheme, VerifyingKey, CURVE25519_KEY_LEN, CURVE25519_PEM_PREFIX_LEN,
      MIN_RSA_KEY_BITS,
    },
    error::{ReqSigError, ReqSigResult},
    request_headers::RequestHeaders,
    signature_header::{SignatureHeaderFields, SIGNATURE_HEADER_NAME},
    signing_string::{Canonicalization, SigningString, REQUEST_TARGET},
    verifier::{SignatureEncoding, SignedRequestVerifier, VerifierConfig},
  };
}

/* ----------------------------------------------------------------- */
