//! Dealing and scoring tests.

use uuid::Uuid;

use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::dealing::deal;
use crate::domain::deck::create_deck;
use crate::domain::scoring::score_grid;
use crate::domain::state::{Grid, GridPos, PlayerId};

fn ids(n: usize) -> Vec<PlayerId> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

#[test]
fn deal_produces_expected_shape() {
    let players = ids(2);
    let mut deck = create_deck(4, 1);
    let before = deck.len();

    let grids = deal(&mut deck, &players, 6).unwrap();

    assert_eq!(grids.len(), 2);
    for (_, grid) in &grids {
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.occupied_count(), 6);
        assert!(grid.occupied().all(|(_, card)| !card.face_up));
    }
    assert_eq!(deck.len(), before - 12);
}

#[test]
fn deal_grids_do_not_overlap() {
    let players = ids(3);
    let mut deck = create_deck(6, 5);
    let grids = deal(&mut deck, &players, 12).unwrap();

    let mut seen = std::collections::HashSet::new();
    for (_, grid) in &grids {
        for (_, card) in grid.occupied() {
            assert!(seen.insert(card.id), "card dealt twice");
        }
    }
    // Nothing dealt remains in the deck either.
    for card in &deck {
        assert!(!seen.contains(&card.id));
    }
}

#[test]
fn deal_rejects_bad_game_mode() {
    let players = ids(2);
    let mut deck = create_deck(4, 1);
    assert!(deal(&mut deck, &players, 7).is_err());
    assert!(deal(&mut deck, &players, 0).is_err());
    assert!(deal(&mut deck, &players, 33).is_err());
}

#[test]
fn short_deck_deals_what_it_has() {
    let players = ids(2);
    // Only 5 cards for a 12-card deal: first player gets 5, second none.
    let mut deck: Vec<Card> = create_deck(1, 3).into_iter().take(5).collect();
    let grids = deal(&mut deck, &players, 6).unwrap();

    assert_eq!(grids[0].1.occupied_count(), 5);
    assert_eq!(grids[1].1.occupied_count(), 0);
    assert!(deck.is_empty());
}

#[test]
fn deal_is_deterministic_per_seed() {
    let players = ids(2);
    let order = |seed| {
        let mut deck = create_deck(4, seed);
        deal(&mut deck, &players, 6)
            .unwrap()
            .into_iter()
            .flat_map(|(_, grid)| {
                grid.occupied()
                    .map(|(_, c)| (c.rank, c.suit))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(order(42), order(42));
    assert_ne!(order(42), order(43));
}

#[test]
fn scoring_follows_the_value_table() {
    let mut grid = Grid::new(2);
    grid.put(GridPos::new(0, 0), Card::new(Rank::Ace, Some(Suit::Spades)))
        .unwrap();
    grid.put(GridPos::new(0, 1), Card::new(Rank::Ten, Some(Suit::Hearts)))
        .unwrap();
    grid.put(GridPos::new(0, 2), Card::new(Rank::King, Some(Suit::Clubs)))
        .unwrap();
    grid.put(GridPos::new(1, 0), Card::new(Rank::Joker, None))
        .unwrap();

    // 1 + 0 + 15 + (-1)
    assert_eq!(score_grid(&grid), 15);
}

#[test]
fn scoring_ignores_empty_cells_and_face_state() {
    let mut grid = Grid::new(2);
    let mut card = Card::new(Rank::Five, Some(Suit::Diamonds));
    card.face_up = true;
    grid.put(GridPos::new(1, 2), card).unwrap();
    assert_eq!(score_grid(&grid), 5);
    assert_eq!(score_grid(&Grid::new(3)), 0);
}
