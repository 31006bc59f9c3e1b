// Proptest generators for domain types.
// Generators stay inside the legal envelope: standard ranks only, valid
// game modes, player counts the dealer accepts.

use proptest::prelude::*;

use crate::domain::cards::{Card, Rank, Suit};

pub fn suit() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Clubs),
        Just(Suit::Diamonds),
        Just(Suit::Hearts),
        Just(Suit::Spades),
    ]
}

/// Any of the thirteen standard ranks.
pub fn rank() -> impl Strategy<Value = Rank> {
    (0..Rank::STANDARD.len()).prop_map(|i| Rank::STANDARD[i])
}

/// A freshly minted card with a standard rank, or a joker.
pub fn card() -> impl Strategy<Value = Card> {
    prop_oneof![
        4 => (rank(), suit()).prop_map(|(rank, suit)| Card::new(rank, Some(suit))),
        1 => Just(()).prop_map(|_| Card::new(Rank::Joker, None)),
    ]
}

/// A valid game mode: multiple of 3 in 6..=30.
pub fn game_mode() -> impl Strategy<Value = u8> {
    (2u8..=10).prop_map(|rows| rows * 3)
}

pub fn player_count() -> impl Strategy<Value = usize> {
    2usize..=6
}

pub fn seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}
