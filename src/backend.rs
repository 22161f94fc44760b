use crate::cookie::Cookie;

/// Client-side key/value slot storage with cookie semantics.
///
/// `write` takes the decoded value and the store encodes it for the wire.
/// `read` hands back the wire form untouched, so decoding failures surface
/// to the caller instead of being swallowed by the store.
pub trait CookieStore: Clone + Send + Sync + 'static {
    fn read(&self, name: &str) -> Option<String>;
    fn write(&self, cookie: Cookie);
}
