//! Session cookie carrying the name of the visitor's current upload.
//!
//! The name is read per request and handed to the loader as a plain argument.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};

pub const SESSION_COOKIE: &str = "uploaded_file";

/// The upload name stored in the request's session cookie, if any.
pub fn uploaded_file(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value remembering `file_name` for later requests.
pub fn session_cookie(file_name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={file_name}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn no_cookie_means_no_upload() {
        assert_eq!(uploaded_file(&HeaderMap::new()), None);
        assert_eq!(uploaded_file(&headers_with(&["theme=dark"])), None);
        assert_eq!(uploaded_file(&headers_with(&["uploaded_file="])), None);
    }

    #[test]
    fn finds_session_cookie_among_others() {
        let headers = headers_with(&["theme=dark; uploaded_file=sales.csv", "lang=en"]);
        assert_eq!(uploaded_file(&headers).as_deref(), Some("sales.csv"));

        let headers = headers_with(&["theme=dark", "uploaded_file=q1.csv"]);
        assert_eq!(uploaded_file(&headers).as_deref(), Some("q1.csv"));
    }

    #[test]
    fn cookie_round_trips_through_headers() {
        let cookie = session_cookie("my_data.csv").unwrap();
        let text = cookie.to_str().unwrap();
        assert!(text.starts_with("uploaded_file=my_data.csv;"));

        let first_pair = text.split(';').next().unwrap();
        let headers = headers_with(&[first_pair]);
        assert_eq!(uploaded_file(&headers).as_deref(), Some("my_data.csv"));
    }
}
