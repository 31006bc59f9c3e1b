//! Edge-triggered events derived from before/after documents.

use crate::domain::state::{Game, GameStatus, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The turn became a specific player.
    TurnBecame { player_id: PlayerId },

    /// Status moved between machine states.
    StatusChanged { from: GameStatus, to: GameStatus },

    /// The game reached Finished; `winner` is final.
    GameEnded { winner: Option<PlayerId> },
}

/// Derive events by comparing the document before and after a committed
/// mutation. Pure; the service logs these and notifies subscribers.
pub fn derive_events(before: &Game, after: &Game) -> Vec<GameEvent> {
    let mut events = Vec::new();

    let turn_before = before.players.get(before.current_player_index).map(|p| p.id);
    let turn_after = after.players.get(after.current_player_index).map(|p| p.id);
    if let Some(player_id) = turn_after {
        if turn_before != Some(player_id) && after.status != GameStatus::Finished {
            events.push(GameEvent::TurnBecame { player_id });
        }
    }

    if before.status != after.status {
        events.push(GameEvent::StatusChanged {
            from: before.status,
            to: after.status,
        });
    }

    if before.status != GameStatus::Finished && after.status == GameStatus::Finished {
        events.push(GameEvent::GameEnded {
            winner: after.winner,
        });
    }

    events
}
