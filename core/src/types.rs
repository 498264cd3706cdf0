//! Domain DTOs for the Mesto API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! the integration tests catch drift between the two crates.
//!
//! The server references users in two shapes: a bare id (`"owner": "a1"`) or
//! a populated document (`"owner": {"_id": "a1", "name": ...}`). Ids may also
//! be numeric. The client keeps only the id, as a string, in every case.

use serde::{Deserialize, Deserializer, Serialize};

/// The signed-in user's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id", deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    pub about: String,
    /// Avatar image URL.
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A photo post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    #[serde(rename = "_id", deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(rename = "link")]
    pub image_url: String,
    #[serde(rename = "owner", default, deserialize_with = "de_reference")]
    pub owner_id: String,
    /// Ids of the users who liked the card, in server order.
    #[serde(rename = "likes", default, deserialize_with = "de_references")]
    pub liked_by: Vec<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Card {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.liked_by.iter().any(|id| id == user_id)
    }

    pub fn like_count(&self) -> usize {
        self.liked_by.len()
    }
}

/// Request payload for `PATCH /users/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub about: String,
}

/// Request payload for `PATCH /users/me/avatar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarUpdate {
    pub avatar: String,
}

/// Request payload for `POST /cards`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCard {
    pub name: String,
    pub link: String,
}

/// Request payload for `/signup` and `/signin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// `/signin` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Account identity returned by the auth service (`/signup`, `/users/me`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    #[serde(rename = "_id", default, deserialize_with = "de_optional_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
}

/// The auth service wraps payloads in `{"data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReference {
    Id(RawId),
    Document {
        #[serde(rename = "_id")]
        id: RawId,
    },
}

impl From<RawReference> for String {
    fn from(raw: RawReference) -> Self {
        match raw {
            RawReference::Id(id) | RawReference::Document { id } => id.into(),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn de_optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|id| id.map(String::from))
}

fn de_reference<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawReference::deserialize(deserializer).map(String::from)
}

fn de_references<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Vec::<RawReference>::deserialize(deserializer).map(|refs| refs.into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_accepts_populated_owner_and_likes() {
        let card: Card = serde_json::from_str(
            r#"{
                "_id": "c1",
                "name": "Baikal",
                "link": "https://example.com/baikal.jpg",
                "owner": {"_id": "u1", "name": "Jacques", "about": "Sailor", "avatar": "a.png"},
                "likes": [{"_id": "u2", "name": "Ann"}, {"_id": "u3"}],
                "createdAt": "2021-01-01T00:00:00.000Z"
            }"#,
        )
        .unwrap();
        assert_eq!(card.owner_id, "u1");
        assert_eq!(card.liked_by, vec!["u2", "u3"]);
        assert_eq!(card.image_url, "https://example.com/baikal.jpg");
        assert!(card.is_liked_by("u3"));
        assert!(!card.is_liked_by("u1"));
    }

    #[test]
    fn card_accepts_bare_ids_and_numeric_id() {
        let card: Card = serde_json::from_str(
            r#"{"_id": 1, "name": "n", "link": "l", "owner": "u1", "likes": ["u2", 7]}"#,
        )
        .unwrap();
        assert_eq!(card.id, "1");
        assert_eq!(card.owner_id, "u1");
        assert_eq!(card.liked_by, vec!["u2", "7"]);
        assert!(card.created_at.is_none());
    }

    #[test]
    fn card_missing_likes_defaults_to_empty() {
        let card: Card = serde_json::from_str(r#"{"_id": "c", "name": "n", "link": "l"}"#).unwrap();
        assert!(card.liked_by.is_empty());
        assert_eq!(card.like_count(), 0);
    }

    #[test]
    fn card_serializes_with_wire_names() {
        let card = Card {
            id: "c1".into(),
            name: "n".into(),
            image_url: "l".into(),
            owner_id: "u1".into(),
            liked_by: vec!["u2".into()],
            created_at: None,
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["_id"], "c1");
        assert_eq!(json["link"], "l");
        assert_eq!(json["owner"], "u1");
        assert_eq!(json["likes"][0], "u2");
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn user_email_is_optional() {
        let user: User =
            serde_json::from_str(r#"{"_id":"u1","name":"n","about":"a","avatar":"x"}"#).unwrap();
        assert!(user.email.is_none());
    }

    #[test]
    fn identity_without_id() {
        let envelope: Envelope<Identity> = serde_json::from_str(r#"{"data":{"email":"a@b.com"}}"#).unwrap();
        assert_eq!(envelope.data.email, "a@b.com");
        assert!(envelope.data.id.is_none());
    }
}
