//! Engine configuration.

use std::time::Duration;

use crate::domain::transitions::StopPolicy;

/// Tunables for the game flow service.
#[derive(Debug, Clone, Copy)]
pub struct FlowConfig {
    /// Grace window between dealing and the round opening
    /// (Starting -> Playing). Players may peek locally during it.
    pub start_grace: Duration,
    /// Grace window between stop being called and end-game running
    /// (Ending -> Finished).
    pub ending_grace: Duration,
    /// How many times a mutation is retried after losing an optimistic
    /// commit race before the conflict is surfaced to the caller.
    pub max_commit_retries: u32,
    /// Who may call stop; see `StopPolicy`.
    pub stop_policy: StopPolicy,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            start_grace: Duration::from_secs(10),
            ending_grace: Duration::from_secs(5),
            max_commit_retries: 5,
            stop_policy: StopPolicy::CurrentTurnOnly,
        }
    }
}
