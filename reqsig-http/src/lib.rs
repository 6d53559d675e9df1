//! # reqsig-http
//!
//! `reqsig-http` extends `http::Request` and `http::HeaderMap` with verification of the `Signature` header
//! of signed requests.
//!
//! Header names are matched case-insensitively here, as HTTP does, while `reqsig` looks up plain maps with exact names.
//! Everything runs synchronously and a [`SignedRequestVerifier`](prelude::SignedRequestVerifier) can be shared
//! across threads.

mod error;
mod http_request;
mod trace;

pub use error::{HttpReqSigError, HttpReqSigResult};
pub use http_request::SignedRequest;
pub use reqsig::prelude;

/* ----------------------------------------------------------------- */
