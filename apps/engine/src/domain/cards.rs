//! Core card types: Suit, Rank, Ability, Card, and the rank-derived
//! value/ability tables that everything else treats as the single source
//! of truth.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CardId = Uuid;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Joker,
    /// Placeholder for a stored card whose rank could not be reconstructed
    /// at ingestion. Never produced by deck construction.
    Unknown,
}

impl Rank {
    /// The thirteen standard ranks, in deck-construction order.
    pub const STANDARD: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];
}

/// Rule-triggered side effects bound to certain ranks.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// K: time-boxed client-local reveal of one of the actor's own cards.
    PeekSelf,
    /// 7: permanently flip any grid card face up.
    FlipOpponent,
    /// Q: exchange one own cell with an opponent's cell.
    Swap,
    /// J: the current player acts again; never enters the pending sub-state.
    DoubleTurn,
}

/// Scoring value of a rank. A→1, 2–9→face, 10→0, J/Q/K→15, joker→−1.
/// Unknown scores 0 so a corrupted card cannot swing the result.
pub fn point_value(rank: Rank) -> i32 {
    match rank {
        Rank::Ace => 1,
        Rank::Two => 2,
        Rank::Three => 3,
        Rank::Four => 4,
        Rank::Five => 5,
        Rank::Six => 6,
        Rank::Seven => 7,
        Rank::Eight => 8,
        Rank::Nine => 9,
        Rank::Ten => 0,
        Rank::Jack | Rank::Queen | Rank::King => 15,
        Rank::Joker => -1,
        Rank::Unknown => 0,
    }
}

/// Ability carried by a rank, if any. Numeric ranks and jokers have none.
pub fn ability_for(rank: Rank) -> Option<Ability> {
    match rank {
        Rank::Seven => Some(Ability::FlipOpponent),
        Rank::Jack => Some(Ability::DoubleTurn),
        Rank::Queen => Some(Ability::Swap),
        Rank::King => Some(Ability::PeekSelf),
        _ => None,
    }
}

/// A single physical card. Identity is the `id`; a card moves between
/// zones by ownership transfer and is never copied into a second identity.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Card {
    pub id: CardId,
    /// None iff the rank is Joker (or an ingestion placeholder).
    pub suit: Option<Suit>,
    pub rank: Rank,
    pub face_up: bool,
}

impl Card {
    pub fn new(rank: Rank, suit: Option<Suit>) -> Self {
        Self {
            id: Uuid::new_v4(),
            suit,
            rank,
            face_up: false,
        }
    }

    pub fn value(&self) -> i32 {
        point_value(self.rank)
    }

    pub fn ability(&self) -> Option<Ability> {
        ability_for(self.rank)
    }

    /// Recall matching: same rank and same suit (both None for jokers).
    pub fn matches(&self, other: &Card) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }
}
