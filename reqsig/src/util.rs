/// Remove every literal double quotation from the given string
pub(crate) fn strip_quotes(s: &str) -> String {
  s.replace('"', "")
}

/// Remove every literal double quotation from the given bytes
pub(crate) fn strip_quote_bytes(bytes: &mut Vec<u8>) {
  bytes.retain(|b| *b != b'"');
}
