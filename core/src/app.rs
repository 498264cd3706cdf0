//! Application façade: one request per user action, then a local merge.
//!
//! # Design
//! `App` owns everything the client needs (both API clients, the transport,
//! the session and the gallery) and is constructed explicitly. Each operation
//! fires one request, awaits it, and only then mutates state, replacing it
//! with the server's representation. `&mut self` on every mutating operation
//! means two responses can never interleave their merges.
//!
//! Every failure is logged here and handed back to the caller, which decides
//! what the user sees.

use tracing::{debug, info, warn};

use crate::auth::AuthClient;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{ApiError, AppError};
use crate::gallery::Gallery;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::{Session, View};
use crate::store::{FileTokenStore, TokenStore};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{AvatarUpdate, Card, Credentials, NewCard, ProfileUpdate, User};

pub struct App<T, S> {
    api: ApiClient,
    auth: AuthClient,
    transport: T,
    session: Session<S>,
    gallery: Gallery,
}

impl App<ReqwestTransport, FileTokenStore> {
    pub fn from_config(config: &Config) -> Self {
        let mut api = ApiClient::new(&config.api_url);
        if let Some(token) = &config.api_token {
            api = api.with_token(token);
        }
        Self::new(
            api,
            AuthClient::new(&config.auth_url),
            ReqwestTransport::new(),
            FileTokenStore::new(&config.token_file),
        )
    }
}

impl<T: Transport, S: TokenStore> App<T, S> {
    pub fn new(api: ApiClient, auth: AuthClient, transport: T, store: S) -> Self {
        Self {
            api,
            auth,
            transport,
            session: Session::new(store),
            gallery: Gallery::new(),
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<S> {
        &mut self.session
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the profile and the card list concurrently and replace both once
    /// both have arrived. Nothing changes if either request fails.
    pub async fn load(&mut self) -> Result<(), AppError> {
        let api = &self.api;
        let transport = &self.transport;

        let joined = tokio::try_join!(
            async { api.parse_current_user(transport.execute(api.build_current_user()).await?) },
            async { api.parse_list_cards(transport.execute(api.build_list_cards()).await?) },
        );
        let (user, cards) = joined.inspect_err(|e| warn!(error = %e, "initial load failed"))?;

        debug!(user = %user.id, cards = cards.len(), "initial load complete");
        self.gallery.replace(user, cards);
        Ok(())
    }

    pub async fn update_profile(&mut self, name: &str, about: &str) -> Result<&User, AppError> {
        let input = ProfileUpdate {
            name: name.to_string(),
            about: about.to_string(),
        };
        let request = self.api.build_update_profile(&input)?;
        let user = self
            .send(request, "update profile", |api, r| api.parse_update_profile(r))
            .await?;
        self.gallery.set_user(user);
        Ok(self.current_user()?)
    }

    pub async fn update_avatar(&mut self, url: &str) -> Result<&User, AppError> {
        let input = AvatarUpdate {
            avatar: url.to_string(),
        };
        let request = self.api.build_update_avatar(&input)?;
        let user = self
            .send(request, "update avatar", |api, r| api.parse_update_avatar(r))
            .await?;
        self.gallery.set_user(user);
        Ok(self.current_user()?)
    }

    /// Create a card; the server's copy is prepended to the gallery.
    pub async fn add_card(&mut self, name: &str, image_url: &str) -> Result<&Card, AppError> {
        let input = NewCard {
            name: name.to_string(),
            link: image_url.to_string(),
        };
        let request = self.api.build_create_card(&input)?;
        let card = self
            .send(request, "create card", |api, r| api.parse_create_card(r))
            .await?;
        info!(card = %card.id, "card created");
        self.gallery.prepend_card(card);
        Ok(&self.gallery.cards()[0])
    }

    /// Set the like state explicitly and return the server's copy of the
    /// card. A gallery entry with the same id is replaced by it, like set
    /// included; cards outside the gallery are returned without a merge.
    pub async fn set_like(&mut self, card_id: &str, liked: bool) -> Result<Card, AppError> {
        let request = self.api.build_set_like(card_id, liked);
        let card = self
            .send(request, "set like", |api, r| api.parse_set_like(r))
            .await?;
        if !self.gallery.replace_card(card.clone()) {
            debug!(card = card_id, "liked card is not in the gallery");
        }
        Ok(card)
    }

    /// Flip the current user's like on a card in the gallery.
    pub async fn toggle_like(&mut self, card_id: &str) -> Result<Card, AppError> {
        let card = self
            .gallery
            .card(card_id)
            .ok_or_else(|| AppError::UnknownCard(card_id.to_string()))?;
        let user = self.current_user()?;
        let liked = card.is_liked_by(&user.id);
        self.set_like(card_id, !liked).await
    }

    /// Delete a card and drop it from the gallery. Ids not in the gallery are
    /// still sent; the local removal is then a no-op.
    pub async fn delete_card(&mut self, card_id: &str) -> Result<(), AppError> {
        let request = self.api.build_delete_card(card_id);
        self.send(request, "delete card", |api, r| api.parse_delete_card(r))
            .await?;
        self.gallery.remove_card(card_id);
        info!(card = card_id, "card deleted");
        Ok(())
    }

    /// Create an account. Success returns the user to the login view; it does
    /// not sign them in.
    pub async fn register(&mut self, email: &str, password: &str) -> Result<(), AppError> {
        self.session.begin();
        let result = self.register_request(email, password).await;
        match result {
            Ok(()) => {
                info!(email, "registered");
                self.session.registered();
                Ok(())
            }
            Err(e) => {
                warn!(email, error = %e, "registration failed");
                self.session.registration_failed();
                Err(e.into())
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), AppError> {
        self.session.begin();
        let result = self.login_request(email, password).await;
        let token = match result {
            Ok(token) => token,
            Err(e) => {
                warn!(email, error = %e, "login failed");
                self.session.login_failed();
                return Err(e.into());
            }
        };
        if let Err(e) = self.session.logged_in(email, &token) {
            warn!(email, error = %e, "could not persist token");
            self.session.login_failed();
            return Err(e.into());
        }
        self.api = self.api.with_token(&token);
        Ok(())
    }

    /// Confirm `token` with the auth service. A terminal rejection clears the
    /// stored token; a retryable failure keeps it for the next start.
    pub async fn validate_existing_token(&mut self, token: &str) -> Result<(), AppError> {
        self.session.begin();
        let request = self.auth.build_validate_token(token);
        let result = match self.transport.execute(request).await {
            Ok(response) => self.auth.parse_validate_token(response),
            Err(e) => Err(e),
        };
        match result {
            Ok(identity) => {
                self.session.token_accepted(&identity.email);
                self.api = self.api.with_token(token);
                Ok(())
            }
            Err(e) => {
                let clear = e.is_rejection();
                warn!(error = %e, clear, "stored token rejected");
                self.session.token_rejected(clear)?;
                Err(e.into())
            }
        }
    }

    /// Validate the stored token, if there is one. Returns whether a session
    /// was restored.
    pub async fn restore_session(&mut self) -> Result<bool, AppError> {
        let Some(token) = self.session.stored_token()? else {
            debug!("no stored token");
            return Ok(false);
        };
        self.validate_existing_token(&token).await?;
        Ok(true)
    }

    /// Forget the token and the cached data. Local state is dropped before
    /// the store is touched, so a store failure still leaves the app signed
    /// out.
    pub fn logout(&mut self) -> Result<(), AppError> {
        self.api = self.api.without_token();
        self.gallery.clear();
        self.session
            .logout()
            .inspect_err(|e| warn!(error = %e, "could not clear stored token"))?;
        Ok(())
    }

    /// Switch between the login and registration screens.
    pub fn show(&mut self, view: View) {
        self.session.show(view);
    }

    async fn register_request(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let request = self.auth.build_register(&credentials(email, password))?;
        let response = self.transport.execute(request).await?;
        self.auth.parse_register(response).map(|_| ())
    }

    async fn login_request(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let request = self.auth.build_login(&credentials(email, password))?;
        let response = self.transport.execute(request).await?;
        self.auth.parse_login(response)
    }

    async fn send<R>(
        &self,
        request: HttpRequest,
        action: &str,
        parse: impl FnOnce(&ApiClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let result = match self.transport.execute(request).await {
            Ok(response) => parse(&self.api, response),
            Err(e) => Err(e),
        };
        result.inspect_err(|e| warn!(action, error = %e, retryable = e.is_retryable(), "request failed"))
    }

    fn current_user(&self) -> Result<&User, AppError> {
        self.gallery.user().ok_or(AppError::NoCurrentUser)
    }
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}
