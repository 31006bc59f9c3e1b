//! The optimistic commit loop every mutation goes through.

use std::sync::Arc;

use tracing::debug;

use crate::domain::events::{derive_events, GameEvent};
use crate::domain::state::{Game, GameId};
use crate::errors::domain::DomainError;
use crate::services::game_flow::GameFlowService;
use crate::store::{GameStore, Versioned};

/// Result of a committed mutation: the stored document, its new version,
/// the events the change produced, and whatever the transition yielded
/// (a drawn card, an applied flag, ...).
#[derive(Debug)]
pub struct MutationOutcome<T> {
    pub version: u64,
    pub game: Game,
    pub events: Vec<GameEvent>,
    pub value: T,
}

/// Load fresh state, apply the pure transition, and commit conditionally;
/// on an optimistic-lock conflict the whole read-apply-commit is retried
/// against fresh state, up to `max_retries` extra attempts. A validation
/// error from the transition aborts immediately with nothing written.
pub(crate) async fn commit_mutation<T, F>(
    store: &Arc<dyn GameStore>,
    max_retries: u32,
    game_id: GameId,
    mutation: F,
) -> Result<MutationOutcome<T>, DomainError>
where
    F: Fn(&mut Game) -> Result<T, DomainError>,
{
    let mut attempt: u32 = 0;
    loop {
        let Versioned {
            version,
            doc: before,
        } = store.load(game_id).await?;

        let mut after = before.clone();
        let value = mutation(&mut after)?;

        match store.commit(game_id, version, after.clone()).await {
            Ok(committed) => {
                let events = derive_events(&before, &after);
                return Ok(MutationOutcome {
                    version: committed.version,
                    game: committed.doc,
                    events,
                    value,
                });
            }
            Err(err) if err.is_optimistic_lock() && attempt < max_retries => {
                attempt += 1;
                debug!(%game_id, attempt, "commit lost the race; retrying against fresh state");
            }
            Err(err) => return Err(err),
        }
    }
}

/// Commit loop for the idempotent lifecycle transitions. When the
/// transition reports it applied nothing (`Ok(false)`), the store write is
/// skipped entirely: a late or duplicate job neither bumps the document
/// version nor costs a concurrent real mutation a retry.
pub(crate) async fn commit_if_applied<F>(
    store: &Arc<dyn GameStore>,
    max_retries: u32,
    game_id: GameId,
    mutation: F,
) -> Result<bool, DomainError>
where
    F: Fn(&mut Game) -> Result<bool, DomainError>,
{
    let mut attempt: u32 = 0;
    loop {
        let Versioned {
            version,
            doc: mut after,
        } = store.load(game_id).await?;

        if !mutation(&mut after)? {
            return Ok(false);
        }

        match store.commit(game_id, version, after).await {
            Ok(_) => return Ok(true),
            Err(err) if err.is_optimistic_lock() && attempt < max_retries => {
                attempt += 1;
                debug!(%game_id, attempt, "commit lost the race; retrying against fresh state");
            }
            Err(err) => return Err(err),
        }
    }
}

impl GameFlowService {
    /// Run a pure transition through the atomic commit loop.
    pub async fn run_mutation<T, F>(
        &self,
        game_id: GameId,
        mutation: F,
    ) -> Result<MutationOutcome<T>, DomainError>
    where
        F: Fn(&mut Game) -> Result<T, DomainError>,
    {
        commit_mutation(
            &self.store,
            self.config.max_commit_retries,
            game_id,
            mutation,
        )
        .await
    }
}
