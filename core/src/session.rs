//! Authentication state machine.
//!
//! # Design
//! `Session` owns the token store and tracks `AuthState`, the signed-in
//! email, the current `View` and at most one pending `Notification`. It does
//! no I/O of its own: `App` performs the request and then reports the outcome
//! through one of the transition methods below.
//!
//! ```text
//! Anonymous --begin--> Authenticating --logged_in / token_accepted--> Authenticated
//!     ^                      |                                            |
//!     +-- *_failed / rejected+                         logout / rejected--+
//! ```

use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Top-level screen the application should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Main,
}

/// Outcome popup raised by registration and login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    RegistrationSucceeded,
    RegistrationFailed,
    LoginFailed,
}

impl Notification {
    pub fn is_success(&self) -> bool {
        matches!(self, Notification::RegistrationSucceeded)
    }
}

#[derive(Debug)]
pub struct Session<S> {
    store: S,
    state: AuthState,
    email: Option<String>,
    view: View,
    notification: Option<Notification>,
}

impl<S: TokenStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: AuthState::Anonymous,
            email: None,
            view: View::Login,
            notification: None,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notification
    }

    /// Dismiss the pending notification, returning it.
    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    pub fn stored_token(&self) -> Result<Option<String>, StoreError> {
        self.store.load()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Navigate between the login and registration screens. The main view is
    /// only reachable through authentication.
    pub fn show(&mut self, view: View) {
        if view == View::Main && !self.is_authenticated() {
            debug!("main view requested without a session");
            return;
        }
        self.view = view;
    }

    /// A credential or token check is in flight.
    pub fn begin(&mut self) {
        if self.state != AuthState::Authenticated {
            self.state = AuthState::Authenticating;
        }
    }

    pub fn registered(&mut self) {
        self.settle_anonymous();
        self.view = View::Login;
        self.notification = Some(Notification::RegistrationSucceeded);
    }

    pub fn registration_failed(&mut self) {
        self.settle_anonymous();
        self.notification = Some(Notification::RegistrationFailed);
    }

    /// Persist `token` and enter the authenticated state.
    pub fn logged_in(&mut self, email: &str, token: &str) -> Result<(), StoreError> {
        if let Err(e) = self.store.save(token) {
            self.settle_anonymous();
            return Err(e);
        }
        self.authenticate(email);
        info!(email, "logged in");
        Ok(())
    }

    pub fn login_failed(&mut self) {
        self.settle_anonymous();
        self.notification = Some(Notification::LoginFailed);
    }

    /// A stored token was confirmed by the auth service.
    pub fn token_accepted(&mut self, email: &str) {
        self.authenticate(email);
        info!(email, "session restored");
    }

    /// A stored token could not be confirmed. When `clear` is set the token
    /// is also removed from the store.
    pub fn token_rejected(&mut self, clear: bool) -> Result<(), StoreError> {
        self.state = AuthState::Anonymous;
        self.email = None;
        self.view = View::Login;
        if clear {
            self.store.clear()?;
        }
        Ok(())
    }

    /// Drop the session, then remove the stored token. The session is
    /// anonymous afterwards even when the store fails.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.state = AuthState::Anonymous;
        self.email = None;
        self.view = View::Login;
        info!("logged out");
        self.store.clear()
    }

    fn authenticate(&mut self, email: &str) {
        self.state = AuthState::Authenticated;
        self.email = Some(email.to_string());
        self.view = View::Main;
    }

    fn settle_anonymous(&mut self) {
        if self.state == AuthState::Authenticating {
            self.state = AuthState::Anonymous;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::store::MemoryTokenStore;

    /// Accepts nothing: every write fails.
    struct ReadOnlyStore;

    impl TokenStore for ReadOnlyStore {
        fn load(&self) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn save(&mut self, _token: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(io::Error::other("read-only")))
        }

        fn clear(&mut self) -> Result<(), StoreError> {
            Err(StoreError::Io(io::Error::other("read-only")))
        }
    }

    fn session() -> Session<MemoryTokenStore> {
        Session::new(MemoryTokenStore::new())
    }

    #[test]
    fn starts_anonymous_on_login_view() {
        let s = session();
        assert_eq!(s.state(), AuthState::Anonymous);
        assert_eq!(s.view(), View::Login);
        assert!(s.email().is_none());
        assert!(s.notification().is_none());
    }

    #[test]
    fn login_persists_token_and_authenticates() {
        let mut s = session();
        s.begin();
        assert_eq!(s.state(), AuthState::Authenticating);
        s.logged_in("a@b.com", "T").unwrap();
        assert_eq!(s.state(), AuthState::Authenticated);
        assert_eq!(s.email(), Some("a@b.com"));
        assert_eq!(s.view(), View::Main);
        assert_eq!(s.stored_token().unwrap().as_deref(), Some("T"));
    }

    #[test]
    fn failed_login_returns_to_anonymous_with_notification() {
        let mut s = session();
        s.begin();
        s.login_failed();
        assert_eq!(s.state(), AuthState::Anonymous);
        assert_eq!(s.notification(), Some(Notification::LoginFailed));
        assert_eq!(s.stored_token().unwrap(), None);
    }

    #[test]
    fn registration_does_not_authenticate() {
        let mut s = session();
        s.show(View::Register);
        s.begin();
        s.registered();
        assert_eq!(s.state(), AuthState::Anonymous);
        assert_eq!(s.view(), View::Login);
        assert_eq!(s.take_notification(), Some(Notification::RegistrationSucceeded));
        assert!(s.notification().is_none());
    }

    #[test]
    fn failed_registration_stays_on_register_view() {
        let mut s = session();
        s.show(View::Register);
        s.begin();
        s.registration_failed();
        assert_eq!(s.view(), View::Register);
        assert!(!s.notification().unwrap().is_success());
    }

    #[test]
    fn rejected_token_is_cleared_only_on_request() {
        let mut s = Session::new(MemoryTokenStore::with_token("stale"));
        s.begin();
        s.token_rejected(false).unwrap();
        assert_eq!(s.state(), AuthState::Anonymous);
        assert_eq!(s.stored_token().unwrap().as_deref(), Some("stale"));

        s.begin();
        s.token_rejected(true).unwrap();
        assert_eq!(s.stored_token().unwrap(), None);
    }

    #[test]
    fn logout_clears_everything() {
        let mut s = session();
        s.logged_in("a@b.com", "T").unwrap();
        s.logout().unwrap();
        assert_eq!(s.state(), AuthState::Anonymous);
        assert_eq!(s.view(), View::Login);
        assert!(s.email().is_none());
        assert_eq!(s.stored_token().unwrap(), None);
    }

    #[test]
    fn logout_resets_state_when_store_fails() {
        let mut s = Session::new(ReadOnlyStore);
        s.token_accepted("a@b.com");

        assert!(matches!(s.logout(), Err(StoreError::Io(_))));
        assert_eq!(s.state(), AuthState::Anonymous);
        assert_eq!(s.view(), View::Login);
        assert!(s.email().is_none());
    }

    #[test]
    fn failed_token_save_settles_anonymous() {
        let mut s = Session::new(ReadOnlyStore);
        s.begin();
        assert!(s.logged_in("a@b.com", "T").is_err());
        assert_eq!(s.state(), AuthState::Anonymous);
        assert!(s.email().is_none());
    }

    #[test]
    fn main_view_requires_session() {
        let mut s = session();
        s.show(View::Main);
        assert_eq!(s.view(), View::Login);
        s.token_accepted("a@b.com");
        s.show(View::Register);
        s.show(View::Main);
        assert_eq!(s.view(), View::Main);
    }
}
