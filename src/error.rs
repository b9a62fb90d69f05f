//! Error types for the session state engine.
//!
//! Errors only exist at the input boundary: turning a raw line into a
//! message, a message into an [`Event`](crate::event::Event), or an
//! ISUPPORT value into a derived table. Applying an event to the state
//! never fails.

use thiserror::Error;

/// Convenience type alias for Results using [`StateError`].
pub type Result<T, E = StateError> = std::result::Result<T, E>;

/// Top-level errors returned by [`SessionState::handle_line`](crate::state::SessionState::handle_line).
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum StateError {
    /// The raw line could not be tokenized.
    #[error("invalid message: {0}")]
    Parse(#[from] MessageParseError),

    /// The message was recognized but its parameters do not fit the event.
    #[error("invalid event: {0}")]
    Event(#[from] EventError),
}

/// Errors encountered when tokenizing a raw IRC line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty after stripping the line terminator.
    #[error("empty message")]
    EmptyMessage,

    /// The line did not match `[@tags] [:source] <command> [params]`.
    #[error("parsing failed at position {position}: {context}")]
    ParseContext {
        /// Character position where parsing failed.
        position: usize,
        /// Description of what was being parsed.
        context: String,
    },
}

/// Errors encountered when converting a message into an event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EventError {
    /// Not enough parameters for the command.
    #[error("{command}: not enough arguments: expected {expected}, got {got}")]
    NotEnoughArguments {
        /// Command or numeric name.
        command: String,
        /// Minimum number of parameters.
        expected: usize,
        /// Actual number of parameters.
        got: usize,
    },

    /// The command needs a source (`:nick!user@host`) but none was given.
    #[error("{command}: missing message source")]
    MissingSource {
        /// Command name.
        command: String,
    },
}

/// Errors encountered when interpreting ISUPPORT values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IsupportError {
    /// `PREFIX` was not shaped like `(<modes>)<prefixes>`.
    #[error("malformed PREFIX value: {0:?}")]
    MalformedPrefix(String),

    /// The mode run and the prefix run have different lengths.
    #[error("PREFIX length mismatch: {modes} modes, {prefixes} prefixes")]
    PrefixLengthMismatch {
        /// Number of mode characters.
        modes: usize,
        /// Number of prefix characters.
        prefixes: usize,
    },

    /// A mode or prefix character appears twice.
    #[error("duplicate PREFIX character: {0:?}")]
    DuplicatePrefixChar(char),
}
