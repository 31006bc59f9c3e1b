//! The turn/ability state machine.
//!
//! Every function here is a pure transition over a `Game` document: it
//! validates against exactly the document it is given, then either applies
//! the full successor state or returns a structured error with nothing
//! mutated. Actor legality is always checked against this document, never
//! against anything a client claims, so the service layer can re-run a
//! transition against a freshly loaded document inside its atomic commit
//! loop.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::cards::{Ability, Card, CardId};
use crate::domain::scoring::score_grid;
use crate::domain::state::{ActiveAbility, Game, GameStatus, GridPos, PlayerId};
use crate::errors::domain::{DomainError, ValidationKind};

/// Who may call stop. The original rules are ambiguous here, so the policy
/// is explicit and configurable rather than implied.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum StopPolicy {
    CurrentTurnOnly,
    AnyPlayer,
}

/// Target of a pending ability resolution.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AbilityTarget {
    /// Flip any player's card face up (the actor's own is permitted).
    Flip { player_id: PlayerId, pos: GridPos },
    /// Exchange one of the actor's cells with an opponent's cell.
    Swap {
        own: GridPos,
        other_player: PlayerId,
        other_pos: GridPos,
    },
    /// Peek resolves without touching shared state.
    Peek,
}

fn require_status(game: &Game, want: GameStatus, action: &str) -> Result<(), DomainError> {
    if game.status != want {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("{action} requires {want:?}, game is {:?}", game.status),
        ));
    }
    Ok(())
}

fn require_current_turn(game: &Game, actor: PlayerId) -> Result<(), DomainError> {
    let current = game.current_player()?;
    if current.id != actor {
        return Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            format!("player {actor} acted on {}'s turn", current.id),
        ));
    }
    Ok(())
}

/// Open the round: Starting -> Playing. Idempotent; running it against a
/// document that already left Starting is a successful no-op, so the
/// deferred start job is safe to fire twice or late.
pub fn begin_play(game: &mut Game) -> Result<bool, DomainError> {
    if game.status != GameStatus::Starting {
        return Ok(false);
    }
    game.status = GameStatus::Playing;
    // Normalize the turn flags onto the opening index.
    game.set_current_index(game.current_player_index);
    Ok(true)
}

/// Pop the deck head as the actor's held card. The held card leaves the
/// document entirely until it is discarded or placed; turn and status are
/// untouched.
pub fn draw_from_deck(game: &mut Game, actor: PlayerId) -> Result<Card, DomainError> {
    require_status(game, GameStatus::Playing, "draw")?;
    require_current_turn(game, actor)?;
    if game.deck.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::EmptyDeck,
            "deck is empty; pick from the discard pile instead",
        ));
    }
    Ok(game.deck.remove(0))
}

/// Pop the discard head as the actor's held card.
pub fn pick_from_discard(game: &mut Game, actor: PlayerId) -> Result<Card, DomainError> {
    require_status(game, GameStatus::Playing, "pick")?;
    require_current_turn(game, actor)?;
    if game.discard_pile.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::EmptyDiscard,
            "discard pile is empty",
        ));
    }
    Ok(game.discard_pile.remove(0))
}

/// Shared tail of both discard paths: the card that just hit the discard
/// head decides whether the turn advances, repeats, or waits on a target.
fn settle_discard(game: &mut Game, actor: PlayerId, ability: Option<Ability>, card_id: CardId) {
    match ability {
        None => game.advance_turn(),
        // The discarder acts again; no pending sub-state.
        Some(Ability::DoubleTurn) => {}
        Some(ability) => {
            game.status = GameStatus::AwaitingAbilityTarget;
            game.active_ability = Some(ActiveAbility {
                player_id: actor,
                ability,
                card_id,
            });
        }
    }
}

/// Discard the held card directly, without touching the grid.
pub fn discard_held(game: &mut Game, actor: PlayerId, mut held: Card) -> Result<(), DomainError> {
    require_status(game, GameStatus::Playing, "discard")?;
    require_current_turn(game, actor)?;

    held.face_up = true;
    let ability = held.ability();
    let card_id = held.id;
    game.discard_pile.insert(0, held);
    settle_discard(game, actor, ability, card_id);
    Ok(())
}

/// Replace one of the actor's own occupied cells with the held card. The
/// evicted occupant goes face up to the discard head, and its ability (not
/// the held card's) drives the turn/ability outcome.
pub fn replace_at(
    game: &mut Game,
    actor: PlayerId,
    pos: GridPos,
    mut held: Card,
) -> Result<(), DomainError> {
    require_status(game, GameStatus::Playing, "replace")?;
    require_current_turn(game, actor)?;

    let player = game.player_mut(actor)?;
    // Bounds are checked before occupancy, so out-of-grid is
    // InvalidPosition and a vacant in-grid cell is EmptySlot.
    if player.grid.cell(pos)?.is_none() {
        return Err(DomainError::validation(
            ValidationKind::EmptySlot,
            format!("cell ({}, {}) has no card to replace", pos.row, pos.col),
        ));
    }

    held.face_up = false;
    let mut replaced = player
        .grid
        .put(pos, held)?
        .ok_or_else(|| DomainError::validation(ValidationKind::EmptySlot, "cell emptied mid-check"))?;
    replaced.face_up = true;
    let ability = replaced.ability();
    let card_id = replaced.id;
    game.discard_pile.insert(0, replaced);
    settle_discard(game, actor, ability, card_id);
    Ok(())
}

/// Resolve the pending ability. Only the player whose discard triggered it
/// may resolve; any resolution returns the game to Playing and advances the
/// turn by one.
pub fn resolve_ability(
    game: &mut Game,
    actor: PlayerId,
    target: AbilityTarget,
) -> Result<(), DomainError> {
    require_status(game, GameStatus::AwaitingAbilityTarget, "ability resolution")?;
    let active = game.active_ability.ok_or_else(|| {
        DomainError::validation(
            ValidationKind::Other("active_ability".into()),
            "awaiting-ability-target with no active ability",
        )
    })?;
    if active.player_id != actor {
        return Err(DomainError::validation(
            ValidationKind::NotAbilityOwner,
            format!(
                "ability belongs to {}, resolution attempted by {actor}",
                active.player_id
            ),
        ));
    }

    match (active.ability, target) {
        (Ability::FlipOpponent, AbilityTarget::Flip { player_id, pos }) => {
            // Permissive: the actor may flip their own card. Empty cell is
            // a no-op resolution, not an error.
            let player = game.player_mut(player_id)?;
            if let Some(card) = player.grid.cell_mut(pos)? {
                card.face_up = true;
            }
        }
        (
            Ability::Swap,
            AbilityTarget::Swap {
                own,
                other_player,
                other_pos,
            },
        ) => {
            if other_player == actor {
                return Err(DomainError::validation(
                    ValidationKind::InvalidTarget,
                    "swap requires an opponent's cell",
                ));
            }
            // Validate both ends before touching either; face state
            // travels with the cards, nothing is revealed.
            let own_card = game.player(actor)?.grid.cell(own)?.cloned();
            let other_card = game.player(other_player)?.grid.cell(other_pos)?.cloned();
            let (own_card, other_card) = match (own_card, other_card) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(DomainError::validation(
                        ValidationKind::EmptySlot,
                        "swap requires both cells to be occupied",
                    ))
                }
            };
            game.player_mut(actor)?.grid.put(own, other_card)?;
            game.player_mut(other_player)?.grid.put(other_pos, own_card)?;
        }
        (Ability::PeekSelf, AbilityTarget::Peek) => {
            // The reveal is a time-boxed client-local view; nothing in the
            // shared document changes beyond the resolution itself.
        }
        (pending, _) => {
            return Err(DomainError::validation(
                ValidationKind::InvalidTarget,
                format!("target does not fit pending ability {pending:?}"),
            ));
        }
    }

    game.active_ability = None;
    game.status = GameStatus::Playing;
    game.advance_turn();
    Ok(())
}

/// Recall: out-of-turn surrender of own grid cards matching the discard
/// head's (rank, suit). Matching cards go face up ahead of the trigger
/// card; their cells stay empty for good. All-or-nothing: one bad position
/// rejects the whole call.
pub fn recall(game: &mut Game, actor: PlayerId, positions: &[GridPos]) -> Result<(), DomainError> {
    match game.status {
        GameStatus::Playing | GameStatus::AwaitingAbilityTarget | GameStatus::Ending => {}
        _ => {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("recall is not available while {:?}", game.status),
            ))
        }
    }
    let head = match game.discard_head() {
        Some(card) => card.clone(),
        None => {
            return Err(DomainError::validation(
                ValidationKind::EmptyDiscard,
                "nothing on the discard pile to recall against",
            ))
        }
    };
    if positions.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::NoRecallMatch,
            "recall named no positions",
        ));
    }
    let distinct: HashSet<GridPos> = positions.iter().copied().collect();
    if distinct.len() != positions.len() {
        return Err(DomainError::validation(
            ValidationKind::NoRecallMatch,
            "recall named the same cell twice",
        ));
    }

    // Validate every position before vacating any.
    let player = game.player(actor)?;
    for &pos in positions {
        match player.grid.cell(pos)? {
            None => {
                return Err(DomainError::validation(
                    ValidationKind::EmptySlot,
                    format!("cell ({}, {}) is empty", pos.row, pos.col),
                ))
            }
            Some(card) if !card.matches(&head) => {
                return Err(DomainError::validation(
                    ValidationKind::NoRecallMatch,
                    format!(
                        "cell ({}, {}) does not match the discard head",
                        pos.row, pos.col
                    ),
                ))
            }
            Some(_) => {}
        }
    }

    let player = game.player_mut(actor)?;
    let mut surrendered = Vec::with_capacity(positions.len());
    for &pos in positions {
        if let Some(mut card) = player.grid.take(pos)? {
            card.face_up = true;
            surrendered.push(card);
        }
    }
    game.discard_pile.splice(0..0, surrendered);
    Ok(())
}

/// Call stop: flags the caller and freezes the round into Ending. The
/// grace window and the single finish run are the service's job.
pub fn call_stop(game: &mut Game, actor: PlayerId, policy: StopPolicy) -> Result<(), DomainError> {
    require_status(game, GameStatus::Playing, "stop")?;
    match policy {
        StopPolicy::CurrentTurnOnly => require_current_turn(game, actor)?,
        StopPolicy::AnyPlayer => {
            game.player(actor)?;
        }
    }
    game.player_mut(actor)?.has_called_stop = true;
    game.status = GameStatus::Ending;
    Ok(())
}

/// End the game: reveal every grid card, score everyone once, pick the
/// winner (minimum score, ties to the earliest player in turn order), and
/// freeze the document. Idempotent: a Finished document is returned
/// untouched.
pub fn finish_game(game: &mut Game) -> Result<bool, DomainError> {
    match game.status {
        GameStatus::Finished => return Ok(false),
        GameStatus::Ending => {}
        other => {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                format!("finish requires Ending, game is {other:?}"),
            ))
        }
    }

    for player in &mut game.players {
        player.grid.reveal_all();
        player.score = Some(score_grid(&player.grid));
    }

    let mut winner: Option<(PlayerId, i32)> = None;
    for player in &game.players {
        let score = player.score.unwrap_or(0);
        // Strict less-than keeps the earliest player on ties.
        if winner.map_or(true, |(_, best)| score < best) {
            winner = Some((player.id, score));
        }
    }

    game.winner = winner.map(|(id, _)| id);
    game.active_ability = None;
    game.status = GameStatus::Finished;
    game.clear_turn_flags();
    Ok(true)
}
