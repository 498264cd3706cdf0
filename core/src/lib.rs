//! Client core for the Mesto photo-sharing service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A `Transport` executes the
//! round-trip; `App` strings the pieces together into the login, profile and
//! gallery flows.
//!
//! # Design
//! - `ApiClient` and `AuthClient` are stateless apart from their base URL and
//!   static headers. Each operation is a `build_*` / `parse_*` pair.
//! - `Session` is a pure state machine over a `TokenStore`.
//! - `Gallery` holds the last-fetched profile and cards; it is only ever
//!   updated from server responses.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod gallery;
pub mod http;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;

pub use app::App;
pub use auth::AuthClient;
pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, AppError, StoreError};
pub use gallery::Gallery;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{AuthState, Notification, Session, View};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
pub use transport::{ReqwestTransport, Transport};
pub use types::{AvatarUpdate, Card, Credentials, Identity, NewCard, ProfileUpdate, User};
