//! Error types for the configuration and driver layers
//!
//! The cache itself never fails: a missing key is `None` and contract
//! violations panic. These errors cover the code around it.

use thiserror::Error;

// == Error Enum ==
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// An environment variable held a value that could not be used
    #[error("Invalid value {value:?} for {var}: {reason}")]
    InvalidConfig {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Driver line contained only whitespace
    #[error("Empty command")]
    EmptyCommand,

    /// Driver line started with an unrecognised word
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Driver command was missing a required argument
    #[error("Command '{command}' is missing its {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    /// Driver command was given more words than it takes
    #[error("Command '{command}' does not take extra argument '{argument}'")]
    UnexpectedArgument {
        command: &'static str,
        argument: String,
    },
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, Error>;
