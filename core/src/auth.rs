//! Request builder and response parser for the auth service.
//!
//! The auth service lives on its own base URL. `/signup` and `/signin` are
//! unauthenticated; `/users/me` checks a bearer token and answers with the
//! owning account.

use crate::client::{build_request, check_status, parse_json, to_body, AUTHORIZATION};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Credentials, Envelope, Identity, TokenResponse};

#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_register(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = to_body(credentials)?;
        Ok(build_request(&self.base_url, &[], HttpMethod::Post, "/signup", Some(body)))
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = to_body(credentials)?;
        Ok(build_request(&self.base_url, &[], HttpMethod::Post, "/signin", Some(body)))
    }

    pub fn build_validate_token(&self, token: &str) -> HttpRequest {
        let headers = [(AUTHORIZATION.to_string(), format!("Bearer {token}"))];
        build_request(&self.base_url, &headers, HttpMethod::Get, "/users/me", None)
    }

    /// Registration only needs a success status; the identity in the body is
    /// returned when it decodes.
    pub fn parse_register(&self, response: HttpResponse) -> Result<Option<Identity>, ApiError> {
        check_status(&response)?;
        Ok(serde_json::from_str::<Envelope<Identity>>(&response.body)
            .ok()
            .map(|envelope| envelope.data))
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<String, ApiError> {
        let TokenResponse { token } = parse_json::<TokenResponse>(response)?;
        if token.is_empty() {
            return Err(ApiError::DeserializationError("empty token".to_string()));
        }
        Ok(token)
    }

    pub fn parse_validate_token(&self, response: HttpResponse) -> Result<Identity, ApiError> {
        parse_json::<Envelope<Identity>>(response).map(|envelope| envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AuthClient {
        AuthClient::new("http://localhost:3001/")
    }

    fn credentials() -> Credentials {
        Credentials {
            email: "a@b.com".to_string(),
            password: "pw".to_string(),
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_register_posts_credentials() {
        let req = client().build_register(&credentials()).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3001/signup");
        assert!(req.header("authorization").is_none());
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@b.com", "password": "pw"}));
    }

    #[test]
    fn build_login_posts_to_signin() {
        let req = client().build_login(&credentials()).unwrap();
        assert_eq!(req.path, "http://localhost:3001/signin");
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn build_validate_token_sends_bearer() {
        let req = client().build_validate_token("T");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3001/users/me");
        assert_eq!(req.header("authorization"), Some("Bearer T"));
    }

    #[test]
    fn parse_register_tolerates_unexpected_body() {
        assert_eq!(client().parse_register(response(201, "created")).unwrap(), None);
        let identity = client()
            .parse_register(response(201, r#"{"data":{"_id":"u1","email":"a@b.com"}}"#))
            .unwrap()
            .unwrap();
        assert_eq!(identity.email, "a@b.com");
    }

    #[test]
    fn parse_register_conflict() {
        let err = client().parse_register(response(409, "exists")).unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn parse_login_returns_token() {
        assert_eq!(client().parse_login(response(200, r#"{"token":"T"}"#)).unwrap(), "T");
    }

    #[test]
    fn parse_login_rejects_empty_token() {
        let err = client().parse_login(response(200, r#"{"token":""}"#)).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_validate_token_unwraps_envelope() {
        let identity = client()
            .parse_validate_token(response(200, r#"{"data":{"_id":"u1","email":"a@b.com"}}"#))
            .unwrap();
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.id.as_deref(), Some("u1"));
    }
}
