use crate::{
  error::{HttpReqSigError, HttpReqSigResult},
  trace::*,
};
use http::{HeaderMap, Request};
use reqsig::prelude::{
  ReqSigError, ReqSigResult, RequestHeaders, SignatureHeaderFields, SignedRequestVerifier, VerifyingKey,
  SIGNATURE_HEADER_NAME,
};

/* --------------------------------------- */
/// A trait about signed requests carrying a `Signature` header
pub trait SignedRequest {
  type Error;

  /// Check if the request has a signature header
  fn has_signature_header(&self) -> bool;

  /// Extract the fields of the signature header
  fn signature_fields(&self) -> Result<SignatureHeaderFields, Self::Error>;

  /// Extract the key id of the signature header, which callers use to look up the public key
  fn signature_key_id(&self) -> Result<String, Self::Error>;

  /// Verify the signature header with the given verifier.
  /// If key_id is given, it must equal the `keyId` field of the signature header.
  /// `Ok(false)` is returned for a wrong signature, and any error must be taken as not verified as well.
  fn verify_signature<K>(&self, verifier: &SignedRequestVerifier<K>, key_id: Option<&str>) -> Result<bool, Self::Error>
  where
    K: VerifyingKey;
}

/* --------------------------------------- */
impl<B> SignedRequest for Request<B> {
  type Error = HttpReqSigError;

  fn has_signature_header(&self) -> bool {
    has_signature_header_inner(self.headers())
  }

  fn signature_fields(&self) -> HttpReqSigResult<SignatureHeaderFields> {
    Ok(SignatureHeaderFields::from_headers(&RequestView(self))?)
  }

  fn signature_key_id(&self) -> HttpReqSigResult<String> {
    self.signature_fields().map(|fields| fields.key_id)
  }

  fn verify_signature<K>(&self, verifier: &SignedRequestVerifier<K>, key_id: Option<&str>) -> HttpReqSigResult<bool>
  where
    K: VerifyingKey,
  {
    verify_signature_inner(&RequestView(self), verifier, key_id)
  }
}

impl SignedRequest for HeaderMap {
  type Error = HttpReqSigError;

  fn has_signature_header(&self) -> bool {
    has_signature_header_inner(self)
  }

  fn signature_fields(&self) -> HttpReqSigResult<SignatureHeaderFields> {
    Ok(SignatureHeaderFields::from_headers(&HeaderMapView(self))?)
  }

  fn signature_key_id(&self) -> HttpReqSigResult<String> {
    self.signature_fields().map(|fields| fields.key_id)
  }

  fn verify_signature<K>(&self, verifier: &SignedRequestVerifier<K>, key_id: Option<&str>) -> HttpReqSigResult<bool>
  where
    K: VerifyingKey,
  {
    verify_signature_inner(&HeaderMapView(self), verifier, key_id)
  }
}

/* --------------------------------------- */
fn has_signature_header_inner(headers: &HeaderMap) -> bool {
  headers.contains_key(SIGNATURE_HEADER_NAME)
}

fn verify_signature_inner<H, K>(headers: &H, verifier: &SignedRequestVerifier<K>, key_id: Option<&str>) -> HttpReqSigResult<bool>
where
  H: RequestHeaders,
  K: VerifyingKey,
{
  let fields = SignatureHeaderFields::from_headers(headers)?;
  if let Some(expected) = key_id {
    if fields.key_id != expected {
      debug!("Signature keyId `{}` does not match the expected `{expected}`", fields.key_id);
      return Err(HttpReqSigError::KeyIdMismatch {
        expected: expected.to_string(),
        found: fields.key_id,
      });
    }
  }
  Ok(verifier.verify_fields(&fields, headers)?)
}

/* --------------------------------------- */
/// Header lookup over http header map, case-insensitive in names.
/// Multiple values of a header are joined with `, `.
struct HeaderMapView<'a>(&'a HeaderMap);

impl RequestHeaders for HeaderMapView<'_> {
  fn header_value(&self, name: &str) -> ReqSigResult<Option<String>> {
    let values = self
      .0
      .get_all(name)
      .iter()
      .map(|v| v.to_str())
      .collect::<Result<Vec<_>, _>>()
      .map_err(|e| ReqSigError::InvalidHeaderValue(format!("{name}: {e}")))?;
    if values.is_empty() {
      return Ok(None);
    }
    Ok(Some(values.join(", ")))
  }
}

/// Header lookup over http request, which also tells `(request-target)`
struct RequestView<'a, B>(&'a Request<B>);

impl<B> RequestHeaders for RequestView<'_, B> {
  fn header_value(&self, name: &str) -> ReqSigResult<Option<String>> {
    HeaderMapView(self.0.headers()).header_value(name)
  }

  fn request_target(&self) -> Option<String> {
    let uri = self.0.uri();
    let path_and_query = uri
      .path_and_query()
      .map_or_else(|| uri.path(), |path_and_query| path_and_query.as_str());
    Some(format!("{} {}", self.0.method().as_str().to_lowercase(), path_and_query))
  }
}

/* --------------------------------------- */
#[cfg(test)]
#[path = "http_request_tests.rs"]
mod tests;
