use crate::{
  error::{ReqSigError, ReqSigResult},
  request_headers::RequestHeaders,
  trace::*,
  util::strip_quotes,
};
use indexmap::IndexMap;

/// Name of the request header carrying the signature
pub const SIGNATURE_HEADER_NAME: &str = "Signature";

/// Field names in the signature header value
const KEY_ID_FIELD: &str = "keyId";
const HEADERS_FIELD: &str = "headers";
const SIGNATURE_FIELD: &str = "signature";

/* ---------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Fields of a `Signature` header value like `keyId="<id>",headers="<names>",signature="<value>"`
pub struct SignatureHeaderFields {
  /// Opaque identifier of the signer's key
  pub key_id: String,
  /// Names of the signed headers, in signing order
  pub header_names: Vec<String>,
  /// Signature field value with quotations stripped, not yet decoded
  pub signature_value: String,
}

impl SignatureHeaderFields {
  /// Extract the `Signature` header from the request headers and parse it
  pub fn from_headers<H>(headers: &H) -> ReqSigResult<Self>
  where
    H: RequestHeaders + ?Sized,
  {
    let Some(header_value) = headers.header_value(SIGNATURE_HEADER_NAME)? else {
      return Err(ReqSigError::HeaderNotFound(SIGNATURE_HEADER_NAME.to_string()));
    };
    Self::parse(&header_value)
  }

  /// Parse a signature header value.
  ///
  /// The value is split on `,` and each segment on its first `=`. Segments without `=` are dropped, and a field
  /// given more than once keeps its last value. Quotations are removed from values rather than parsed, so commas
  /// inside quoted values are not supported.
  pub fn parse(header_value: &str) -> ReqSigResult<Self> {
    let mut fields: IndexMap<&str, &str> = IndexMap::new();
    for segment in header_value.split(',') {
      let Some((name, value)) = segment.split_once('=') else {
        debug!("Discard signature header segment without `=`");
        continue;
      };
      if fields.insert(name, value).is_some() {
        warn!("Duplicate `{name}` field in signature header, the last one is taken");
      }
    }

    let header_names = fields
      .get(HEADERS_FIELD)
      .ok_or(ReqSigError::HeadersFieldMissing)?
      .split(' ')
      .filter(|name| !name.is_empty())
      .map(strip_quotes)
      .collect::<Vec<_>>();
    let signature_value = strip_quotes(fields.get(SIGNATURE_FIELD).ok_or(ReqSigError::SignatureFieldMissing)?);
    let key_id = strip_quotes(fields.get(KEY_ID_FIELD).ok_or(ReqSigError::KeyIdFieldMissing)?);

    Ok(Self {
      key_id,
      header_names,
      signature_value,
    })
  }

  /// Whether both the covered header list and the signature value have content
  pub fn is_structurally_valid(&self) -> bool {
    !self.header_names.is_empty() && !self.signature_value.is_empty()
  }
}

impl std::fmt::Display for SignatureHeaderFields {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{KEY_ID_FIELD}=\"{}\",{HEADERS_FIELD}=\"{}\",{SIGNATURE_FIELD}=\"{}\"",
      self.key_id,
      self.header_names.join(" "),
      self.signature_value
    )
  }
}
