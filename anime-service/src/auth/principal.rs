//! The authenticated caller and HTTP Basic credential parsing

use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::domain::Role;
use crate::error::Error;

/// An authenticated user, attached to the request by the authentication
/// middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.as_str() == role)
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Authentication required".to_string()))
    }
}

/// Username and password from an `Authorization: Basic` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Parse Basic credentials
///
/// `Ok(None)` when no `Authorization` header is present; an error when one
/// is present but is not well-formed Basic.
pub fn extract_basic(headers: &HeaderMap) -> Result<Option<BasicCredentials>, Error> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let invalid = || Error::Unauthorized("Invalid Authorization header format".to_string());

    let value = header.to_str().map_err(|_| invalid())?;
    let (scheme, encoded) = value.split_once(' ').ok_or_else(invalid)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(invalid());
    }

    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let (username, password) = decoded.split_once(':').ok_or_else(invalid)?;

    Ok(Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_extract_basic() {
        let encoded = STANDARD.encode("mehedi:pass:word");
        let credentials = extract_basic(&headers(&format!("Basic {}", encoded)))
            .unwrap()
            .unwrap();
        assert_eq!(credentials.username, "mehedi");
        assert_eq!(credentials.password, "pass:word");
    }

    #[test]
    fn test_missing_header_is_anonymous() {
        assert!(extract_basic(&HeaderMap::new()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_headers_are_rejected() {
        let no_colon = STANDARD.encode("mehedi");
        for value in [
            "Bearer abc.def.ghi".to_string(),
            "Basic !!!".to_string(),
            "Basic".to_string(),
            format!("Basic {}", no_colon),
        ] {
            let err = extract_basic(&headers(&value)).unwrap_err();
            assert!(matches!(err, Error::Unauthorized(_)), "{value}");
        }
    }

    #[test]
    fn test_has_role() {
        let principal = Principal {
            username: "mehedi".to_string(),
            roles: vec![Role::new("USER")],
        };
        assert!(principal.has_role("USER"));
        assert!(!principal.has_role("ADMIN"));
    }

    #[test]
    fn test_debug_hides_password() {
        let credentials = BasicCredentials {
            username: "u".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(!format!("{:?}", credentials).contains("hunter22"));
    }
}
