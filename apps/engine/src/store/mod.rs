//! Document store contracts.
//!
//! The engine never holds a lock around game logic; consistency comes from
//! the compare-and-swap `commit` below. Implementations must guarantee that
//! a commit succeeds only when the stored version is still the one the
//! caller read, and that every committed change reaches subscribers at
//! least once.

pub mod memory;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::state::{Game, GameId};
use crate::errors::domain::DomainError;

/// A document plus the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub version: u64,
    pub doc: T,
}

/// Pushed to subscribers on every committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice {
    pub game_id: GameId,
    pub version: u64,
}

#[async_trait]
pub trait GameStore: Send + Sync {
    /// Store a brand-new document at version 1.
    async fn create(&self, game: Game) -> Result<Versioned<Game>, DomainError>;

    /// Read the current document and its version.
    async fn load(&self, game_id: GameId) -> Result<Versioned<Game>, DomainError>;

    /// Compare-and-swap write: succeeds (bumping the version) only when the
    /// stored version still equals `expected_version`; otherwise fails with
    /// an OptimisticLock conflict and no write.
    async fn commit(
        &self,
        game_id: GameId,
        expected_version: u64,
        game: Game,
    ) -> Result<Versioned<Game>, DomainError>;

    /// Change notifications for one game, at-least-once. Dropping the
    /// receiver unsubscribes.
    fn subscribe(&self, game_id: GameId) -> broadcast::Receiver<ChangeNotice>;
}

pub use memory::MemoryStore;
