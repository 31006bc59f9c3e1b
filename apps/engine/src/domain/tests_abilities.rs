//! Ability resolution and recall tests.

use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::state::{GameStatus, GridPos};
use crate::domain::test_state_helpers::{game_with_players, plant_card};
use crate::domain::transitions::{discard_held, recall, resolve_ability, AbilityTarget};
use crate::errors::domain::ValidationKind;

/// Discard a card with the given rank so the game enters the pending
/// ability sub-state for player 0.
fn enter_pending(game: &mut crate::domain::state::Game, rank: Rank) {
    let actor = game.players[0].id;
    discard_held(game, actor, Card::new(rank, Some(Suit::Hearts))).unwrap();
    assert_eq!(game.status, GameStatus::AwaitingAbilityTarget);
}

#[test]
fn flip_reveals_the_target_permanently_and_advances() {
    let mut game = game_with_players(3, 6);
    let actor = game.players[0].id;
    let target_player = game.players[1].id;
    let pos = GridPos::new(0, 0);
    enter_pending(&mut game, Rank::Seven);

    resolve_ability(
        &mut game,
        actor,
        AbilityTarget::Flip {
            player_id: target_player,
            pos,
        },
    )
    .unwrap();

    assert!(game.players[1].grid.cell(pos).unwrap().unwrap().face_up);
    assert_eq!(game.status, GameStatus::Playing);
    assert!(game.active_ability.is_none());
    assert_eq!(game.current_player_index, 1);
}

#[test]
fn flip_may_target_the_actors_own_card() {
    let mut game = game_with_players(2, 6);
    let actor = game.players[0].id;
    let pos = GridPos::new(1, 1);
    enter_pending(&mut game, Rank::Seven);

    resolve_ability(
        &mut game,
        actor,
        AbilityTarget::Flip {
            player_id: actor,
            pos,
        },
    )
    .unwrap();

    assert!(game.players[0].grid.cell(pos).unwrap().unwrap().face_up);
}

#[test]
fn flip_on_an_empty_cell_is_a_no_op_resolution() {
    let mut game = game_with_players(2, 6);
    let actor = game.players[0].id;
    let pos = GridPos::new(0, 2);
    game.players[1].grid.take(pos).unwrap();
    let opponent = game.players[1].id;
    enter_pending(&mut game, Rank::Seven);

    resolve_ability(
        &mut game,
        actor,
        AbilityTarget::Flip {
            player_id: opponent,
            pos,
        },
    )
    .unwrap();

    assert_eq!(game.status, GameStatus::Playing);
    assert_eq!(game.current_player_index, 1);
}

#[test]
fn swap_exchanges_cells_without_revealing() {
    let mut game = game_with_players(2, 6);
    let actor = game.players[0].id;
    let opponent = game.players[1].id;
    let own_pos = GridPos::new(0, 0);
    let other_pos = GridPos::new(1, 2);
    let own_card = plant_card(&mut game, 0, own_pos, Rank::Two, Some(Suit::Clubs));
    let other_card = plant_card(&mut game, 1, other_pos, Rank::Nine, Some(Suit::Spades));
    enter_pending(&mut game, Rank::Queen);

    resolve_ability(
        &mut game,
        actor,
        AbilityTarget::Swap {
            own: own_pos,
            other_player: opponent,
            other_pos,
        },
    )
    .unwrap();

    let now_mine = game.players[0].grid.cell(own_pos).unwrap().unwrap();
    let now_theirs = game.players[1].grid.cell(other_pos).unwrap().unwrap();
    assert_eq!(now_mine.id, other_card.id);
    assert_eq!(now_theirs.id, own_card.id);
    assert!(!now_mine.face_up);
    assert!(!now_theirs.face_up);
    assert_eq!(game.status, GameStatus::Playing);
    assert_eq!(game.current_player_index, 1);
}

#[test]
fn swap_rejects_self_and_empty_targets() {
    let mut game = game_with_players(2, 6);
    let actor = game.players[0].id;
    let opponent = game.players[1].id;
    enter_pending(&mut game, Rank::Queen);

    let err = resolve_ability(
        &mut game,
        actor,
        AbilityTarget::Swap {
            own: GridPos::new(0, 0),
            other_player: actor,
            other_pos: GridPos::new(0, 1),
        },
    )
    .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::InvalidTarget));

    game.players[1].grid.take(GridPos::new(0, 1)).unwrap();
    let err = resolve_ability(
        &mut game,
        actor,
        AbilityTarget::Swap {
            own: GridPos::new(0, 0),
            other_player: opponent,
            other_pos: GridPos::new(0, 1),
        },
    )
    .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::EmptySlot));

    // Still pending: failed resolutions change nothing.
    assert_eq!(game.status, GameStatus::AwaitingAbilityTarget);
    assert!(game.active_ability.is_some());
}

#[test]
fn peek_resolves_without_touching_the_board() {
    let mut game = game_with_players(2, 6);
    let actor = game.players[0].id;
    enter_pending(&mut game, Rank::King);
    let grids_before: Vec<_> = game.players.iter().map(|p| p.grid.clone()).collect();

    resolve_ability(&mut game, actor, AbilityTarget::Peek).unwrap();

    let grids_after: Vec<_> = game.players.iter().map(|p| p.grid.clone()).collect();
    assert_eq!(grids_before, grids_after);
    assert_eq!(game.status, GameStatus::Playing);
    assert_eq!(game.current_player_index, 1);
}

#[test]
fn only_the_ability_owner_may_resolve() {
    let mut game = game_with_players(3, 6);
    let intruder = game.players[2].id;
    enter_pending(&mut game, Rank::King);
    let before = game.clone();

    let err = resolve_ability(&mut game, intruder, AbilityTarget::Peek).unwrap_err();

    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotAbilityOwner));
    assert_eq!(game, before);
}

#[test]
fn mismatched_target_is_rejected() {
    let mut game = game_with_players(2, 6);
    let actor = game.players[0].id;
    enter_pending(&mut game, Rank::Seven);

    let err = resolve_ability(&mut game, actor, AbilityTarget::Peek).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::InvalidTarget));
    assert_eq!(game.status, GameStatus::AwaitingAbilityTarget);
}

#[test]
fn recall_surrenders_matching_cards_out_of_turn() {
    let mut game = game_with_players(3, 6);
    // Head is a 5 of hearts; the bystander holds two matching fives.
    let mut head = Card::new(Rank::Five, Some(Suit::Hearts));
    head.face_up = true;
    let head_id = head.id;
    game.discard_pile.insert(0, head);
    let a = plant_card(&mut game, 2, GridPos::new(0, 0), Rank::Five, Some(Suit::Hearts));
    let b = plant_card(&mut game, 2, GridPos::new(1, 1), Rank::Five, Some(Suit::Hearts));
    let bystander = game.players[2].id;
    let turn_before = game.current_player_index;

    recall(
        &mut game,
        bystander,
        &[GridPos::new(0, 0), GridPos::new(1, 1)],
    )
    .unwrap();

    // Surrendered cards sit ahead of the trigger card, face up.
    let surrendered: Vec<_> = game.discard_pile.iter().take(2).collect();
    assert!(surrendered.iter().all(|c| c.face_up));
    assert!(surrendered.iter().any(|c| c.id == a.id));
    assert!(surrendered.iter().any(|c| c.id == b.id));
    assert_eq!(game.discard_pile[2].id, head_id);
    // Cells stay empty; the turn is untouched.
    assert!(game.players[2].grid.cell(GridPos::new(0, 0)).unwrap().is_none());
    assert!(game.players[2].grid.cell(GridPos::new(1, 1)).unwrap().is_none());
    assert_eq!(game.current_player_index, turn_before);
    assert_eq!(game.status, GameStatus::Playing);
}

#[test]
fn recall_is_all_or_nothing() {
    let mut game = game_with_players(2, 6);
    let mut head = Card::new(Rank::Five, Some(Suit::Hearts));
    head.face_up = true;
    game.discard_pile.insert(0, head);
    plant_card(&mut game, 1, GridPos::new(0, 0), Rank::Five, Some(Suit::Hearts));
    plant_card(&mut game, 1, GridPos::new(0, 1), Rank::Six, Some(Suit::Hearts));
    let actor = game.players[1].id;
    let before = game.clone();

    // One matching and one non-matching position: nothing applies.
    let err = recall(&mut game, actor, &[GridPos::new(0, 0), GridPos::new(0, 1)]).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NoRecallMatch));
    assert_eq!(game, before);
}

#[test]
fn recall_rejects_empty_pile_and_duplicate_positions() {
    let mut game = game_with_players(2, 6);
    let actor = game.players[1].id;

    let err = recall(&mut game, actor, &[GridPos::new(0, 0)]).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::EmptyDiscard));

    let mut head = Card::new(Rank::Five, Some(Suit::Hearts));
    head.face_up = true;
    game.discard_pile.insert(0, head);
    plant_card(&mut game, 1, GridPos::new(0, 0), Rank::Five, Some(Suit::Hearts));
    let err = recall(&mut game, actor, &[GridPos::new(0, 0), GridPos::new(0, 0)]).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NoRecallMatch));
}

#[test]
fn recall_stays_available_while_an_ability_is_pending() {
    let mut game = game_with_players(2, 6);
    enter_pending(&mut game, Rank::Queen);
    // The queen on the discard head is the trigger; the opponent happens
    // to hold a matching queen.
    plant_card(&mut game, 1, GridPos::new(1, 0), Rank::Queen, Some(Suit::Hearts));
    let opponent = game.players[1].id;

    recall(&mut game, opponent, &[GridPos::new(1, 0)]).unwrap();

    // The pending ability is untouched.
    assert_eq!(game.status, GameStatus::AwaitingAbilityTarget);
    assert!(game.active_ability.is_some());
}
