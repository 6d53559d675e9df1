use crate::error::ReqSigResult;
use indexmap::IndexMap;
use std::{
  collections::{BTreeMap, HashMap},
  hash::BuildHasher,
};

/// Header lookup of a single HTTP request.
/// Plain maps are looked up with the exact given name; implementations over real HTTP header maps may match
/// case-insensitively as the wire protocol does.
pub trait RequestHeaders {
  /// Value of the header of the given name, `None` if absent
  fn header_value(&self, name: &str) -> ReqSigResult<Option<String>>;

  /// `(request-target)` pseudo header, i.e., `<lowercase method> <path?query>`, if the request can tell it
  fn request_target(&self) -> Option<String> {
    None
  }
}

impl<S: BuildHasher> RequestHeaders for HashMap<String, String, S> {
  fn header_value(&self, name: &str) -> ReqSigResult<Option<String>> {
    Ok(self.get(name).cloned())
  }
}

impl RequestHeaders for BTreeMap<String, String> {
  fn header_value(&self, name: &str) -> ReqSigResult<Option<String>> {
    Ok(self.get(name).cloned())
  }
}

impl<S: BuildHasher> RequestHeaders for IndexMap<String, String, S> {
  fn header_value(&self, name: &str) -> ReqSigResult<Option<String>> {
    Ok(self.get(name).cloned())
  }
}

impl<T: RequestHeaders + ?Sized> RequestHeaders for &T {
  fn header_value(&self, name: &str) -> ReqSigResult<Option<String>> {
    (**self).header_value(name)
  }

  fn request_target(&self) -> Option<String> {
    (**self).request_target()
  }
}
