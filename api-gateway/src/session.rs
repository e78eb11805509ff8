//! Chat session cookie
//!
//! The chat tool correlates turns with the backend's conversation memory
//! through a random session id kept in the `chat_uuid` cookie for 12 hours.

use axum::http::{header, HeaderMap, HeaderValue};
use uuid::Uuid;

pub const SESSION_COOKIE_NAME: &str = "chat_uuid";

/// Cookie lifetime in seconds (12 hours)
pub const SESSION_COOKIE_MAX_AGE: i64 = 12 * 60 * 60;

pub fn new_session_id() -> Uuid {
    Uuid::new_v4()
}

/// `Set-Cookie` value for `session_id`
pub fn create_session_cookie(session_id: Uuid) -> String {
    format!("{SESSION_COOKIE_NAME}={session_id}; Path=/; SameSite=Lax; Max-Age={SESSION_COOKIE_MAX_AGE}")
}

pub fn set_session_cookie(headers: &mut HeaderMap, session_id: Uuid) {
    if let Ok(value) = HeaderValue::from_str(&create_session_cookie(session_id)) {
        headers.insert(header::SET_COOKIE, value);
    }
}

/// Session id from the request's `Cookie` header, if present and well formed
pub fn extract_session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .find_map(|part| {
            part.trim()
                .strip_prefix(SESSION_COOKIE_NAME)
                .and_then(|rest| rest.strip_prefix('='))
                .and_then(|value| Uuid::parse_str(value.trim()).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie_headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_create_cookie() {
        let id = Uuid::nil();
        let cookie = create_session_cookie(id);
        assert!(cookie.starts_with("chat_uuid=00000000-0000-0000-0000-000000000000;"));
        assert!(cookie.contains("Max-Age=43200"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn test_extract_among_other_cookies() {
        let id = new_session_id();
        let headers = cookie_headers(&format!("theme=dark; chat_uuid={id}; other=1"));
        assert_eq!(extract_session_id(&headers), Some(id));
    }

    #[test]
    fn test_extract_missing_or_malformed() {
        assert_eq!(extract_session_id(&HeaderMap::new()), None);
        assert_eq!(extract_session_id(&cookie_headers("chat_uuid=not-a-uuid")), None);
        assert_eq!(extract_session_id(&cookie_headers("chat_uuidx=abc")), None);
    }

    #[test]
    fn test_set_cookie_header() {
        let mut headers = HeaderMap::new();
        let id = new_session_id();
        set_session_cookie(&mut headers, id);
        let value = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.contains(&id.to_string()));
    }
}
