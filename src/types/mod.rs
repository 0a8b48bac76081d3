//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `charge`: Account identifiers, balances, and charge instructions
//! - `error`: Error types for coordinating runs

pub mod charge;
pub mod error;

pub use charge::{AccountId, Balance, ChargeInstruction};
pub use error::RunError;
