/// Bearer Token Extraction
///
/// Parses `Authorization: Bearer <token>` headers.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const BEARER_SCHEME: &str = "Bearer";

/// Extract the raw token from the `Authorization` header
///
/// The header value must be exactly two space-separated parts, the first
/// being the literal `Bearer`.
///
/// # Errors
/// - `MissingHeader` if there is no `Authorization` header
/// - `MalformedHeader` for any other shape, including an empty token
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if *scheme == BEARER_SCHEME && !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extracts_token() {
        let token = extract_bearer(&headers_with("Bearer abc123")).unwrap();
        assert_eq!(token, "abc123");
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(AuthError::MissingHeader));
    }

    #[test]
    fn test_malformed_headers() {
        let cases = [
            "abc123",
            "Basic abc123",
            "bearer abc123",
            "Bearer",
            "Bearer ",
            "Bearer  abc123",
            "Bearer abc 123",
        ];

        for case in cases {
            assert_eq!(
                extract_bearer(&headers_with(case)),
                Err(AuthError::MalformedHeader),
                "header {:?} should be malformed",
                case
            );
        }
    }
}
