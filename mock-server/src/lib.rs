//! In-memory stand-in for the Mesto resource API and its auth service.
//!
//! Both routers share one `Db`. Resource routes require
//! `Authorization: Bearer <token>` with a token issued by `/signin`.

use std::{collections::HashMap, future::IntoFuture, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_NAME: &str = "Жак-Ив Кусто";
pub const DEFAULT_ABOUT: &str = "Исследователь";
pub const DEFAULT_AVATAR: &str =
    "https://pictures.s3.yandex.net/resources/jacques-cousteau_1604399756.png";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub about: String,
    pub avatar: String,
    pub email: String,
}

/// A card with `owner` and `likes` populated as full user documents.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub link: String,
    pub owner: User,
    pub likes: Vec<User>,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub about: String,
}

#[derive(Deserialize)]
pub struct AvatarUpdate {
    pub avatar: String,
}

#[derive(Deserialize)]
pub struct NewCard {
    pub name: String,
    pub link: String,
}

#[derive(Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
}

#[derive(Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Serialize, Deserialize)]
pub struct TokenBody {
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

struct Account {
    user: User,
    password: String,
}

struct CardRecord {
    id: String,
    name: String,
    link: String,
    owner: String,
    likes: Vec<String>,
}

#[derive(Default)]
pub struct Store {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    cards: Vec<CardRecord>,
}

impl Store {
    fn authorize(&self, headers: &HeaderMap) -> Result<String, StatusCode> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;
        self.tokens.get(token).cloned().ok_or(StatusCode::UNAUTHORIZED)
    }

    fn user(&self, id: &str) -> Result<&User, StatusCode> {
        self.accounts
            .get(id)
            .map(|account| &account.user)
            .ok_or(StatusCode::UNAUTHORIZED)
    }

    fn render(&self, record: &CardRecord) -> Result<Card, StatusCode> {
        let owner = self.user(&record.owner)?.clone();
        let likes: Vec<User> = record
            .likes
            .iter()
            .map(|id| self.user(id).cloned())
            .collect::<Result<_, _>>()?;
        Ok(Card {
            id: record.id.clone(),
            name: record.name.clone(),
            link: record.link.clone(),
            owner,
            likes,
        })
    }

    fn card_mut(&mut self, id: &str) -> Result<&mut CardRecord, StatusCode> {
        self.cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or(StatusCode::NOT_FOUND)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn new_db() -> Db {
    Db::default()
}

/// Profile and card routes.
pub fn api_app(db: Db) -> Router {
    Router::new()
        .route("/users/me", get(current_user).patch(update_profile))
        .route("/users/me/avatar", patch(update_avatar))
        .route("/cards", get(list_cards).post(create_card))
        .route("/cards/{id}", axum::routing::delete(delete_card))
        .route("/cards/likes/{id}", put(like_card).delete(unlike_card))
        .with_state(db)
}

/// Registration, login and token check.
pub fn auth_app(db: Db) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/users/me", get(token_owner))
        .with_state(db)
}

pub async fn run(api: TcpListener, auth: TcpListener) -> Result<(), std::io::Error> {
    let db = new_db();
    tokio::try_join!(
        axum::serve(api, api_app(db.clone())).into_future(),
        axum::serve(auth, auth_app(db)).into_future(),
    )?;
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    matches!(email.split_once('@'), Some((local, domain)) if !local.is_empty() && domain.contains('.'))
}

async fn signup(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<(StatusCode, Json<Envelope<Identity>>), StatusCode> {
    if !is_valid_email(&input.email) || input.password.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    if store.accounts.values().any(|a| a.user.email == input.email) {
        return Err(StatusCode::CONFLICT);
    }
    let user = User {
        id: Uuid::new_v4().simple().to_string(),
        name: DEFAULT_NAME.to_string(),
        about: DEFAULT_ABOUT.to_string(),
        avatar: DEFAULT_AVATAR.to_string(),
        email: input.email,
    };
    info!(email = %user.email, "account created");
    let identity = Identity {
        id: user.id.clone(),
        email: user.email.clone(),
    };
    store.accounts.insert(
        user.id.clone(),
        Account {
            user,
            password: input.password,
        },
    );
    Ok((StatusCode::CREATED, Json(Envelope { data: identity })))
}

async fn signin(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<TokenBody>, StatusCode> {
    let mut store = db.write().await;
    let user_id = store
        .accounts
        .values()
        .find(|a| a.user.email == input.email && a.password == input.password)
        .map(|a| a.user.id.clone())
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), user_id);
    debug!(email = %input.email, "token issued");
    Ok(Json(TokenBody { token }))
}

async fn token_owner(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Envelope<Identity>>, StatusCode> {
    let store = db.read().await;
    let id = store.authorize(&headers)?;
    let user = store.user(&id)?;
    Ok(Json(Envelope {
        data: Identity {
            id: user.id.clone(),
            email: user.email.clone(),
        },
    }))
}

async fn current_user(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, StatusCode> {
    let store = db.read().await;
    let id = store.authorize(&headers)?;
    store.user(&id).cloned().map(Json)
}

async fn update_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ProfileUpdate>,
) -> Result<Json<User>, StatusCode> {
    if input.name.trim().is_empty() || input.about.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let id = store.authorize(&headers)?;
    let account = store.accounts.get_mut(&id).ok_or(StatusCode::UNAUTHORIZED)?;
    account.user.name = input.name;
    account.user.about = input.about;
    Ok(Json(account.user.clone()))
}

async fn update_avatar(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<AvatarUpdate>,
) -> Result<Json<User>, StatusCode> {
    if !input.avatar.starts_with("http://") && !input.avatar.starts_with("https://") {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let id = store.authorize(&headers)?;
    let account = store.accounts.get_mut(&id).ok_or(StatusCode::UNAUTHORIZED)?;
    account.user.avatar = input.avatar;
    Ok(Json(account.user.clone()))
}

async fn list_cards(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<Card>>, StatusCode> {
    let store = db.read().await;
    store.authorize(&headers)?;
    let cards: Vec<Card> = store
        .cards
        .iter()
        .map(|record| store.render(record))
        .collect::<Result<_, _>>()?;
    Ok(Json(cards))
}

async fn create_card(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NewCard>,
) -> Result<(StatusCode, Json<Card>), StatusCode> {
    if input.name.trim().is_empty() || input.link.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let mut store = db.write().await;
    let owner = store.authorize(&headers)?;
    let record = CardRecord {
        id: Uuid::new_v4().simple().to_string(),
        name: input.name,
        link: input.link,
        owner,
        likes: Vec::new(),
    };
    let card = store.render(&record)?;
    store.cards.push(record);
    Ok((StatusCode::CREATED, Json(card)))
}

async fn delete_card(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Message>, StatusCode> {
    let mut store = db.write().await;
    let user_id = store.authorize(&headers)?;
    let index = store
        .cards
        .iter()
        .position(|card| card.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if store.cards[index].owner != user_id {
        return Err(StatusCode::FORBIDDEN);
    }
    store.cards.remove(index);
    Ok(Json(Message {
        message: "Пост удалён".to_string(),
    }))
}

async fn like_card(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Card>, StatusCode> {
    set_like(db, headers, id, true).await
}

async fn unlike_card(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Card>, StatusCode> {
    set_like(db, headers, id, false).await
}

async fn set_like(db: Db, headers: HeaderMap, id: String, liked: bool) -> Result<Json<Card>, StatusCode> {
    let mut store = db.write().await;
    let user_id = store.authorize(&headers)?;
    let record = store.card_mut(&id)?;
    record.likes.retain(|like| *like != user_id);
    if liked {
        record.likes.push(user_id);
    }
    let store = &*store;
    let record = store.cards.iter().find(|card| card.id == id).ok_or(StatusCode::NOT_FOUND)?;
    store.render(record).map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_serializes_populated_users() {
        let user = User {
            id: "u1".to_string(),
            name: "n".to_string(),
            about: "a".to_string(),
            avatar: "x".to_string(),
            email: "a@b.com".to_string(),
        };
        let card = Card {
            id: "c1".to_string(),
            name: "Baikal".to_string(),
            link: "https://example.com/b.jpg".to_string(),
            owner: user.clone(),
            likes: vec![user],
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["_id"], "c1");
        assert_eq!(json["owner"]["_id"], "u1");
        assert_eq!(json["likes"][0]["_id"], "u1");
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("nope"));
    }

    #[test]
    fn credentials_reject_missing_password() {
        let result: Result<Credentials, _> = serde_json::from_str(r#"{"email":"a@b.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn authorize_requires_known_bearer() {
        let mut store = Store::default();
        store.tokens.insert("T".to_string(), "u1".to_string());

        let mut headers = HeaderMap::new();
        assert_eq!(store.authorize(&headers), Err(StatusCode::UNAUTHORIZED));

        headers.insert(AUTHORIZATION, "Bearer X".parse().unwrap());
        assert_eq!(store.authorize(&headers), Err(StatusCode::UNAUTHORIZED));

        headers.insert(AUTHORIZATION, "Bearer T".parse().unwrap());
        assert_eq!(store.authorize(&headers), Ok("u1".to_string()));
    }
}
