//! Error types for tree construction and argument resolution.
//!
//! Configuration errors surface while a tree is being built; usage errors
//! surface while an argument vector is resolved. Both are fatal for the
//! invocation and map to exit code `1`.

use thiserror::Error;

use crate::command::CommandId;
use crate::flag::ValueParseError;

/// Errors raised while registering flags on a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The flag shares a short or long form with an already registered flag.
    #[error("flag {flag} already exists or is ambiguous on command {command}; matched flags: {existing}")]
    FlagCollision {
        command: String,
        flag: String,
        existing: String,
    },
}

/// Errors raised while resolving an argument vector.
#[derive(Debug, Error)]
pub enum UsageError {
    /// argv was empty, so there is no executable name to check.
    #[error("argument vector is empty; expected the executable path first")]
    EmptyArgv,

    /// The invoking executable is not named after the root command.
    #[error("root command name {expected} does not match with executable name: {found}")]
    ExecutableMismatch { expected: String, found: String },

    /// Two or more sibling subcommands appeared in the same invocation.
    #[error("you can run one command at a time; found: {}", .found.join(", "))]
    AmbiguousSubcommand { found: Vec<String> },

    /// One flag token matched more than one declared flag.
    #[error("flag {token} matches with more than one flag: {}", .matched.join(", "))]
    AmbiguousFlag { token: String, matched: Vec<String> },

    /// A value flag was the last token or was followed by another flag.
    #[error("missing value for flag {0}")]
    MissingValue(String),

    /// Required flags were still unset after scanning.
    #[error("{} are missing but they were required", .0.join(","))]
    MissingRequired(Vec<String>),

    /// A flag's parser rejected its value.
    #[error("invalid value for flag {flag}: {source}")]
    InvalidValue {
        flag: String,
        #[source]
        source: ValueParseError,
    },

    /// The `run` callback of a command failed.
    #[error("command {command} failed: {source}")]
    RunFailed {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

impl UsageError {
    /// Whether the help page of the failing command should follow the error.
    pub fn shows_help(&self) -> bool {
        matches!(self, Self::MissingRequired(_))
    }
}

/// A [`UsageError`] together with the command whose pass raised it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ResolveError {
    pub command: CommandId,
    pub error: UsageError,
}

impl ResolveError {
    pub(crate) fn new(command: CommandId, error: UsageError) -> Self {
        Self { command, error }
    }
}

/// Convenience alias for resolution results.
pub type Result<T> = std::result::Result<T, ResolveError>;
