//! Domain-level error type used across transitions, stores, and services.
//!
//! This error type is transport-agnostic. Every transition failure is a
//! structured outcome (kind + detail) so the caller can decide whether to
//! retry, re-fetch, or surface a message; nothing here is an opaque failure.

use thiserror::Error;

/// Validation failures: the action was understood but is illegal against
/// the current document. Rejected synchronously, nothing mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    /// Actor is not the current-turn player.
    OutOfTurn,
    /// Action is not legal in the current game status.
    PhaseMismatch,
    /// Deck has no cards to draw. Not fatal: the caller falls back to the
    /// discard pile.
    EmptyDeck,
    /// Discard pile has no cards to pick.
    EmptyDiscard,
    /// Targeted grid cell has no occupant.
    EmptySlot,
    /// Grid position is out of bounds.
    InvalidPosition,
    /// Ability resolution attempted by someone other than the ability owner.
    NotAbilityOwner,
    /// Ability target does not fit the pending ability.
    InvalidTarget,
    /// Recall named a cell that does not match the discard head.
    NoRecallMatch,
    /// Actor already holds a drawn/picked card.
    AlreadyHolding,
    /// Actor has no held card to discard or place.
    NoHeldCard,
    /// Game mode is not a multiple of 3 in 6..=30.
    InvalidGameMode,
    /// Player count unsupported for the requested setup.
    InvalidPlayerCount,
    Other(String),
}

/// Semantic conflicts (extend as needed).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// A concurrent writer committed first; retry against fresh state.
    OptimisticLock,
    /// Create was attempted for an id that already exists.
    GameExists,
    Other(String),
}

/// Missing resources in domain terms.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Game,
    Player,
    Other(String),
}

/// Central domain error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input or business rule violation.
    #[error("validation {kind:?}: {detail}")]
    Validation { kind: ValidationKind, detail: String },
    /// Semantic conflict, typically transient.
    #[error("conflict {kind:?}: {detail}")]
    Conflict { kind: ConflictKind, detail: String },
    /// Missing resource.
    #[error("not found {kind:?}: {detail}")]
    NotFound { kind: NotFoundKind, detail: String },
}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            detail: detail.into(),
        }
    }

    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            detail: detail.into(),
        }
    }

    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            detail: detail.into(),
        }
    }

    /// True for conflicts that should be retried against fresh state.
    pub fn is_optimistic_lock(&self) -> bool {
        matches!(
            self,
            DomainError::Conflict {
                kind: ConflictKind::OptimisticLock,
                ..
            }
        )
    }

    pub fn validation_kind(&self) -> Option<&ValidationKind> {
        match self {
            DomainError::Validation { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
