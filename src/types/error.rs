//! Error types for the ledger race harness
//!
//! Ledger and actor operations are total and never fail. Errors only arise in
//! the coordinator: starting actor threads, building a runtime, and joining
//! actors after the completion barrier has been released.
//!
//! # Error Categories
//!
//! - **Actor Errors**: an actor thread panicked or could not be spawned
//! - **Runtime Errors**: the async runtime could not be built or joined

use thiserror::Error;

/// Main error type for coordinating a run
///
/// A run that returns one of these has still released its completion
/// barrier: every actor signals exactly once, even when it panics or never
/// starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    /// An actor panicked while applying its charges
    ///
    /// Charges the actor applied before panicking remain in the ledger.
    #[error("Actor '{actor}' panicked while applying charges")]
    ActorPanicked {
        /// Name of the actor that panicked
        actor: String,
    },

    /// The thread for an actor could not be started
    #[error("Failed to spawn thread for actor '{actor}': {message}")]
    SpawnFailed {
        /// Name of the actor that never ran
        actor: String,
        /// Description of the spawn failure
        message: String,
    },

    /// The async runtime failed to build or a task could not be joined
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime failure
        message: String,
    },
}

// Conversion from io::Error (runtime builder failures) to RunError
impl From<std::io::Error> for RunError {
    fn from(error: std::io::Error) -> Self {
        RunError::Runtime {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl RunError {
    /// Create an ActorPanicked error
    pub fn actor_panicked(actor: &str) -> Self {
        RunError::ActorPanicked {
            actor: actor.to_string(),
        }
    }

    /// Create a SpawnFailed error
    pub fn spawn_failed(actor: &str, error: &std::io::Error) -> Self {
        RunError::SpawnFailed {
            actor: actor.to_string(),
            message: error.to_string(),
        }
    }

    /// Create a Runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        RunError::Runtime {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::actor_panicked(
        RunError::ActorPanicked { actor: "Costco".to_string() },
        "Actor 'Costco' panicked while applying charges"
    )]
    #[case::spawn_failed(
        RunError::SpawnFailed { actor: "Target".to_string(), message: "out of threads".to_string() },
        "Failed to spawn thread for actor 'Target': out of threads"
    )]
    #[case::runtime(
        RunError::Runtime { message: "no reactor".to_string() },
        "Runtime error: no reactor"
    )]
    fn test_error_display(#[case] error: RunError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::actor_panicked(
        RunError::actor_panicked("CVS"),
        RunError::ActorPanicked { actor: "CVS".to_string() }
    )]
    #[case::runtime(
        RunError::runtime("task cancelled"),
        RunError::Runtime { message: "task cancelled".to_string() }
    )]
    fn test_helper_functions(#[case] result: RunError, #[case] expected: RunError) {
        assert_eq!(result, expected);
    }

    #[test]
    fn test_spawn_failed_keeps_io_message() {
        let io_error = std::io::Error::new(std::io::ErrorKind::WouldBlock, "Resource busy");
        let error = RunError::spawn_failed("Starbucks", &io_error);
        assert_eq!(
            error,
            RunError::SpawnFailed {
                actor: "Starbucks".to_string(),
                message: "Resource busy".to_string(),
            }
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "no worker threads");
        let error: RunError = io_error.into();
        assert!(matches!(error, RunError::Runtime { .. }));
        assert_eq!(error.to_string(), "Runtime error: no worker threads");
    }
}
