//! In-memory copy of the last-fetched profile and card list.
//!
//! Server responses always replace whole values: the user object wholesale,
//! and cards either wholesale or one card at a time matched by id. Nothing in
//! here edits a card's fields locally.

use crate::types::{Card, User};

#[derive(Debug, Clone, Default)]
pub struct Gallery {
    user: Option<User>,
    cards: Vec<Card>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn replace(&mut self, user: User, cards: Vec<Card>) {
        self.user = Some(user);
        self.cards = cards;
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn set_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }

    /// Newly created cards go to the head of the list.
    pub fn prepend_card(&mut self, card: Card) {
        self.cards.insert(0, card);
    }

    /// Swap in the server's version of a card. Returns false when no card
    /// with that id is present.
    pub fn replace_card(&mut self, card: Card) -> bool {
        match self.cards.iter_mut().find(|existing| existing.id == card.id) {
            Some(slot) => {
                *slot = card;
                true
            }
            None => false,
        }
    }

    /// Returns whether anything was removed.
    pub fn remove_card(&mut self, id: &str) -> bool {
        let before = self.cards.len();
        self.cards.retain(|card| card.id != id);
        self.cards.len() != before
    }

    pub fn is_liked_by_me(&self, card: &Card) -> bool {
        self.user.as_ref().is_some_and(|user| card.is_liked_by(&user.id))
    }

    pub fn is_mine(&self, card: &Card) -> bool {
        self.user.as_ref().is_some_and(|user| card.owner_id == user.id)
    }

    pub fn clear(&mut self) {
        self.user = None;
        self.cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, likes: &[&str]) -> Card {
        Card {
            id: id.to_string(),
            name: format!("card {id}"),
            image_url: format!("https://example.com/{id}.jpg"),
            owner_id: "u1".to_string(),
            liked_by: likes.iter().map(|s| s.to_string()).collect(),
            created_at: None,
        }
    }

    fn user() -> User {
        User {
            id: "u1".to_string(),
            name: "Jacques".to_string(),
            about: "Sailor".to_string(),
            avatar: "a.png".to_string(),
            email: None,
        }
    }

    #[test]
    fn prepend_puts_card_first() {
        let mut g = Gallery::new();
        g.set_cards(vec![card("1", &[]), card("2", &[])]);
        g.prepend_card(card("3", &[]));
        let ids: Vec<_> = g.cards().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["3", "1", "2"]);
    }

    #[test]
    fn replace_card_touches_only_matching_id() {
        let mut g = Gallery::new();
        g.set_cards(vec![card("1", &[]), card("2", &["x"])]);
        assert!(g.replace_card(card("1", &["u1"])));
        assert_eq!(g.card("1").unwrap().liked_by, ["u1"]);
        assert_eq!(g.card("2").unwrap().liked_by, ["x"]);
        assert!(!g.replace_card(card("9", &[])));
        assert_eq!(g.cards().len(), 2);
    }

    #[test]
    fn remove_missing_card_is_noop() {
        let mut g = Gallery::new();
        g.set_cards(vec![card("1", &[])]);
        assert!(!g.remove_card("nope"));
        assert_eq!(g.cards().len(), 1);
        assert!(g.remove_card("1"));
        assert!(g.cards().is_empty());
    }

    #[test]
    fn like_and_ownership_follow_current_user() {
        let mut g = Gallery::new();
        let liked = card("1", &["u1"]);
        assert!(!g.is_liked_by_me(&liked));
        g.replace(user(), vec![liked.clone()]);
        assert!(g.is_liked_by_me(&liked));
        assert!(g.is_mine(&liked));
        g.clear();
        assert!(g.user().is_none());
        assert!(g.cards().is_empty());
    }
}
