//! Request builder and response parser for the Mesto resource API.
//!
//! # Design
//! `ApiClient` holds a `base_url` and a static header set (usually carrying
//! `authorization: Bearer <token>`) and no mutable state between calls. Each
//! operation is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that consumes an `HttpResponse`. A `Transport`
//! executes the round-trip in between.
//!
//! Card ids are percent-encoded into path segments.

use serde::de::DeserializeOwned;
use serde::Serialize;
use urlencoding::encode;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{AvatarUpdate, Card, NewCard, ProfileUpdate, User};

pub(crate) const AUTHORIZATION: &str = "authorization";
const CONTENT_TYPE: &str = "content-type";

/// Stateless client for the profile and card endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    headers: Vec<(String, String)>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: Vec::new(),
        }
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    /// A copy of this client that authenticates with `token`.
    pub fn with_token(&self, token: &str) -> Self {
        self.clone().with_header(AUTHORIZATION, &format!("Bearer {token}"))
    }

    /// A copy of this client without an authorization header.
    pub fn without_token(&self) -> Self {
        let mut client = self.clone();
        client.headers.retain(|(key, _)| key != AUTHORIZATION);
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn build_current_user(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/users/me", None)
    }

    pub fn build_list_cards(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/cards", None)
    }

    pub fn build_update_profile(&self, input: &ProfileUpdate) -> Result<HttpRequest, ApiError> {
        let body = to_body(input)?;
        Ok(self.request(HttpMethod::Patch, "/users/me", Some(body)))
    }

    pub fn build_update_avatar(&self, input: &AvatarUpdate) -> Result<HttpRequest, ApiError> {
        let body = to_body(input)?;
        Ok(self.request(HttpMethod::Patch, "/users/me/avatar", Some(body)))
    }

    pub fn build_create_card(&self, input: &NewCard) -> Result<HttpRequest, ApiError> {
        let body = to_body(input)?;
        Ok(self.request(HttpMethod::Post, "/cards", Some(body)))
    }

    /// `PUT` adds the like, `DELETE` removes it.
    pub fn build_set_like(&self, card_id: &str, liked: bool) -> HttpRequest {
        let method = if liked { HttpMethod::Put } else { HttpMethod::Delete };
        self.request(method, &format!("/cards/likes/{}", encode(card_id)), None)
    }

    pub fn build_delete_card(&self, card_id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/cards/{}", encode(card_id)), None)
    }

    pub fn parse_current_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_cards(&self, response: HttpResponse) -> Result<Vec<Card>, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_profile(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_avatar(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_card(&self, response: HttpResponse) -> Result<Card, ApiError> {
        parse_json(response)
    }

    pub fn parse_set_like(&self, response: HttpResponse) -> Result<Card, ApiError> {
        parse_json(response)
    }

    /// The body, if any, is ignored.
    pub fn parse_delete_card(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        build_request(&self.base_url, &self.headers, method, path, body)
    }
}

pub(crate) fn build_request(
    base_url: &str,
    headers: &[(String, String)],
    method: HttpMethod,
    path: &str,
    body: Option<String>,
) -> HttpRequest {
    let mut headers = headers.to_vec();
    if body.is_some() && !headers.iter().any(|(key, _)| key == CONTENT_TYPE) {
        headers.push((CONTENT_TYPE.to_string(), "application/json".to_string()));
    }
    HttpRequest {
        method,
        path: format!("{base_url}{path}"),
        headers,
        body,
    }
}

pub(crate) fn to_body<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))
}

pub(crate) fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Any non-2xx status becomes `ApiError::HttpError`.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
