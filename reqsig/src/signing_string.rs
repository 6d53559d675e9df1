use crate::{
  error::ReqSigResult,
  request_headers::RequestHeaders,
  signature_header::SignatureHeaderFields,
  trace::*,
  util::strip_quote_bytes,
};

/// Pseudo header name of the request method and target
pub const REQUEST_TARGET: &str = "(request-target)";

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
/// How covered header values are assembled into the signing string
pub enum Canonicalization {
  /// Raw values concatenated in order without any separator or name, then every `"` removed
  #[default]
  Concatenated,
  /// `<lowercase name>: <value>` lines joined by `\n`, as in the cavage http signatures draft.
  /// `(request-target)` is taken from the request if it can tell it.
  HeaderLines,
}

/* ---------------------------------------- */
#[derive(Debug, Clone, PartialEq, Eq)]
/// Byte sequence that the sender signed, rebuilt from the request
pub struct SigningString(Vec<u8>);

impl SigningString {
  /// Build the signing string by concatenating covered header values
  pub fn build<H>(fields: &SignatureHeaderFields, headers: &H) -> ReqSigResult<Self>
  where
    H: RequestHeaders + ?Sized,
  {
    Self::build_with(fields, headers, Canonicalization::Concatenated)
  }

  /// Build the signing string in the given canonicalization.
  /// Covered headers absent from the request are taken as empty values.
  pub fn build_with<H>(fields: &SignatureHeaderFields, headers: &H, canonicalization: Canonicalization) -> ReqSigResult<Self>
  where
    H: RequestHeaders + ?Sized,
  {
    let bytes = match canonicalization {
      Canonicalization::Concatenated => {
        let mut bytes = Vec::new();
        for name in &fields.header_names {
          bytes.extend_from_slice(lookup_header(headers, name)?.as_bytes());
        }
        strip_quote_bytes(&mut bytes);
        bytes
      }
      Canonicalization::HeaderLines => {
        let lines = fields
          .header_names
          .iter()
          .map(|name| {
            let target = (name == REQUEST_TARGET).then(|| headers.request_target()).flatten();
            let value = match target {
              Some(target) => target,
              None => lookup_header(headers, name)?,
            };
            Ok(format!("{}: {}", name.to_lowercase(), value))
          })
          .collect::<ReqSigResult<Vec<_>>>()?;
        lines.join("\n").into_bytes()
      }
    };
    Ok(Self(bytes))
  }

  /// Returns the signing string as bytes to be verified
  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }

  pub fn into_bytes(self) -> Vec<u8> {
    self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl std::fmt::Display for SigningString {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", String::from_utf8_lossy(&self.0))
  }
}

fn lookup_header<H>(headers: &H, name: &str) -> ReqSigResult<String>
where
  H: RequestHeaders + ?Sized,
{
  match headers.header_value(name)? {
    Some(value) => Ok(value),
    None => {
      warn!("Covered header `{name}` not found in the request, taken as empty");
      Ok(String::new())
    }
  }
}
