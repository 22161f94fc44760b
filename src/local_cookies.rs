use crate::{
    backend::CookieStore,
    cookie::{parse_cookie_header, percent_encode, Cookie},
};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredCookie {
    wire_value: String,
    expires: Option<DateTime<Utc>>,
}

/// In-memory cookie jar. Built from a request's `Cookie` header it plays the
/// browser's part for one request, and remembers what was written so the
/// response can carry the matching `Set-Cookie` headers.
#[derive(Debug, Clone, Default)]
pub struct LocalCookies {
    cookies: Arc<Mutex<HashMap<String, StoredCookie>>>,
    written: Arc<Mutex<Vec<Cookie>>>,
}

impl LocalCookies {
    pub fn from_header(header: &str) -> Self {
        let jar = Self::default();
        {
            let mut cookies = jar.cookies.lock().unwrap();
            for (name, wire_value) in parse_cookie_header(header) {
                // Browsers don't send expiry back, only live cookies.
                cookies.insert(
                    name,
                    StoredCookie {
                        wire_value,
                        expires: None,
                    },
                );
            }
        }
        jar
    }

    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.written
            .lock()
            .unwrap()
            .iter()
            .map(Cookie::to_set_cookie_header)
            .collect()
    }

    fn cleanup_expired_cookies(&self, now: DateTime<Utc>) {
        self.cookies
            .lock()
            .unwrap()
            .retain(|name, cookie| match cookie.expires {
                Some(expires) if expires <= now => {
                    debug!(cookie_name = %name, "Dropping expired cookie");
                    false
                }
                _ => true,
            });
    }
}

impl CookieStore for LocalCookies {
    fn read(&self, name: &str) -> Option<String> {
        self.cleanup_expired_cookies(Utc::now());

        self.cookies
            .lock()
            .unwrap()
            .get(name)
            .map(|cookie| cookie.wire_value.clone())
    }

    fn write(&self, cookie: Cookie) {
        self.cookies.lock().unwrap().insert(
            cookie.name.clone(),
            StoredCookie {
                wire_value: percent_encode(&cookie.value),
                expires: Some(cookie.expires),
            },
        );

        let mut written = self.written.lock().unwrap();
        written.retain(|previous| previous.name != cookie.name);
        written.push(cookie);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_write_read_single_cookie() {
        let local_cookies = LocalCookies::default();
        assert_eq!(local_cookies.read("slot"), None);

        let expires = Utc::now() + Duration::days(30);
        local_cookies.write(Cookie::new("slot", "a b;c", expires));

        assert_eq!(local_cookies.read("slot").unwrap(), "a%20b%3Bc");
        assert_eq!(local_cookies.set_cookie_headers().len(), 1);
    }

    #[test]
    fn test_from_header_keeps_wire_values() {
        let local_cookies = LocalCookies::from_header("theme=dark; slot=%5B%5D");
        assert_eq!(local_cookies.read("theme").unwrap(), "dark");
        assert_eq!(local_cookies.read("slot").unwrap(), "%5B%5D");
        assert!(local_cookies.set_cookie_headers().is_empty());
    }

    #[test]
    fn test_rewrite_replaces_pending_header() {
        let local_cookies = LocalCookies::default();
        let expires = Utc::now() + Duration::days(30);

        local_cookies.write(Cookie::new("slot", "first", expires));
        local_cookies.write(Cookie::new("other", "x", expires));
        local_cookies.write(Cookie::new("slot", "second", expires));

        let headers = local_cookies.set_cookie_headers();
        assert_eq!(headers.len(), 2);
        assert!(headers[0].starts_with("other=x;"));
        assert!(headers[1].starts_with("slot=second;"));
        assert_eq!(local_cookies.read("slot").unwrap(), "second");
    }

    #[test]
    fn cleanup_expired_cookies() {
        let local_cookies = LocalCookies::from_header("sent=3");

        local_cookies.write(Cookie::new("fresh", "1", Utc::now() + Duration::days(1)));
        local_cookies.write(Cookie::new("stale", "2", Utc::now() - Duration::hours(2)));

        assert_eq!(local_cookies.read("stale"), None);
        assert_eq!(local_cookies.read("fresh").unwrap(), "1");
        assert_eq!(local_cookies.read("sent").unwrap(), "3");
        assert_eq!(local_cookies.cookies.lock().unwrap().len(), 2);
    }
}
