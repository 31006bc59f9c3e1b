//! Multi-deck construction and seeded shuffling.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::cards::{Card, Rank, Suit};

/// Build `52 * number_of_decks` standard cards plus `2 * number_of_decks`
/// jokers, every card face down with a fresh id, then shuffle uniformly.
///
/// The shuffle is Fisher-Yates via the seeded RNG, so a given seed always
/// yields the same permutation. Callers derive the seed from entropy at
/// game creation; tests pass fixed seeds.
pub fn create_deck(number_of_decks: usize, seed: u64) -> Vec<Card> {
    let mut deck = Vec::with_capacity(54 * number_of_decks);
    for _ in 0..number_of_decks {
        for suit in Suit::ALL {
            for rank in Rank::STANDARD {
                deck.push(Card::new(rank, Some(suit)));
            }
        }
        deck.push(Card::new(Rank::Joker, None));
        deck.push(Card::new(Rank::Joker, None));
    }

    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
    deck
}
