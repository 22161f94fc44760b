use chrono::{DateTime, Utc};
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CookieError {
    #[error("Truncated percent escape at byte {0}")]
    TruncatedEscape(usize),
    #[error("Invalid percent escape at byte {0}")]
    InvalidEscape(usize),
    #[error("Decoded cookie value is not valid UTF-8")]
    InvalidUtf8,
}

/// A single named value in the client-side store, together with the
/// attributes it is written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
    pub same_site: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, expires: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires,
            path: "/".into(),
            same_site: "Lax".into(),
        }
    }

    /// Renders the cookie as a `Set-Cookie` header value. The value is
    /// percent-encoded so separators inside it can't leak into the header.
    pub fn to_set_cookie_header(&self) -> String {
        format!(
            "{}={}; Expires={}; Path={}; SameSite={}",
            self.name,
            percent_encode(&self.value),
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.path,
            self.same_site
        )
    }
}

/// Parses a request `Cookie` header (`a=1; b=2`) into raw name/value pairs.
/// Values are returned as sent, still percent-encoded.
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')'
        )
}

/// Escapes everything outside the `encodeURIComponent` unreserved set.
pub fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if is_unreserved(byte) {
            encoded.push(byte as char);
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

pub fn percent_decode(value: &str) -> Result<String, CookieError> {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            decoded.push(bytes[i]);
            i += 1;
            continue;
        }
        let hex = bytes
            .get(i + 1..i + 3)
            .ok_or(CookieError::TruncatedEscape(i))?;
        let hex = std::str::from_utf8(hex).map_err(|_| CookieError::InvalidEscape(i))?;
        let byte = u8::from_str_radix(hex, 16).map_err(|_| CookieError::InvalidEscape(i))?;
        decoded.push(byte);
        i += 3;
    }
    String::from_utf8(decoded).map_err(|_| CookieError::InvalidUtf8)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case("plain", "plain")]
    #[test_case("a;b,c=d", "a%3Bb%2Cc%3Dd")]
    #[test_case("Garcia Lopez", "Garcia%20Lopez")]
    #[test_case("{\"id\":1}", "%7B%22id%22%3A1%7D")]
    #[test_case("Muñoz", "Mu%C3%B1oz")]
    fn test_percent_encode(raw: &str, encoded: &str) {
        assert_eq!(percent_encode(raw), encoded);
        assert_eq!(percent_decode(encoded).unwrap(), raw);
    }

    #[test_case("abc%", CookieError::TruncatedEscape(3))]
    #[test_case("abc%4", CookieError::TruncatedEscape(3))]
    #[test_case("%ZZ", CookieError::InvalidEscape(0))]
    #[test_case("%FF%FE", CookieError::InvalidUtf8)]
    fn test_percent_decode_rejects(encoded: &str, expected: CookieError) {
        assert_eq!(percent_decode(encoded).unwrap_err(), expected);
    }

    #[test]
    fn test_set_cookie_header() {
        let expires = Utc.with_ymd_and_hms(2030, 1, 15, 8, 30, 0).unwrap();
        let cookie = Cookie::new("slot", "[1, 2]", expires);
        assert_eq!(
            cookie.to_set_cookie_header(),
            "slot=%5B1%2C%202%5D; Expires=Tue, 15 Jan 2030 08:30:00 GMT; Path=/; SameSite=Lax"
        );
    }

    #[test]
    fn test_parse_cookie_header() {
        let pairs = parse_cookie_header("theme=dark; slot=%5B%5D;broken; =x");
        assert_eq!(
            pairs,
            vec![
                ("theme".to_string(), "dark".to_string()),
                ("slot".to_string(), "%5B%5D".to_string()),
            ]
        );
    }
}
