pub mod domain;

pub use domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
