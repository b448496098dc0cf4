//! Error types for channel state tracking.
//!
//! This module defines the top-level [`ChanStateError`] together with the
//! detailed causes it wraps: capability (ISUPPORT) parsing failures, mode
//! string desyncs, and inbound line parsing failures.

use thiserror::Error;

/// Convenience type alias for Results using [`ChanStateError`].
pub type Result<T, E = ChanStateError> = std::result::Result<T, E>;

/// Top-level channel state errors.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ChanStateError {
    /// The channel exists but belongs to another connection.
    #[error("channel {channel} is owned by a different connection")]
    OwnershipConflict {
        /// Canonical channel name.
        channel: String,
    },

    /// No channel with this canonical name is registered.
    #[error("no such channel: {0}")]
    NotFound(String),

    /// A server-advertised capability value could not be used.
    #[error("malformed {token} capability: {value:?}")]
    MalformedCapability {
        /// ISUPPORT token name (e.g. `CHANMODES`).
        token: &'static str,
        /// The raw token value.
        value: String,
        /// What was wrong with it.
        #[source]
        cause: CapabilityParseError,
    },

    /// A mode change could not be decoded without losing parameter alignment.
    #[error("protocol desync in mode string {modes:?} on {channel}")]
    ProtocolDesync {
        /// Channel the mode change was addressed to.
        channel: String,
        /// The raw mode string.
        modes: String,
        /// Where decoding went wrong.
        #[source]
        cause: ModeParseError,
    },

    /// An inbound line could not be parsed.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw line.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing ISUPPORT capability values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CapabilityParseError {
    /// CHANMODES did not contain exactly four groups.
    #[error("expected 4 comma-separated groups, got {0}")]
    WrongGroupCount(usize),

    /// PREFIX was not of the form `(letters)symbols`.
    #[error("missing parenthesized mode letters")]
    MissingParens,

    /// PREFIX letters and symbols differ in length.
    #[error("{letters} mode letters but {symbols} prefix symbols")]
    PrefixLengthMismatch {
        /// Number of mode letters.
        letters: usize,
        /// Number of prefix symbols.
        symbols: usize,
    },

    /// MODES was not a positive integer.
    #[error("expected a positive integer")]
    InvalidModeCount,

    /// A mode letter was declared in more than one category.
    #[error("mode {0:?} declared in more than one category")]
    DuplicateMode(char),
}

/// Errors encountered when decoding channel mode strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeParseError {
    /// A mode letter appeared before any `+` or `-`.
    #[error("mode {mode:?} has no preceding + or -")]
    MissingModeModifier {
        /// The offending mode letter.
        mode: char,
    },

    /// The parameter list ran out before a mode that needs one.
    #[error("mode {mode:?} needs parameter #{index} but only {available} were given")]
    MissingParameter {
        /// The mode letter that needed a parameter.
        mode: char,
        /// Zero-based index of the missing parameter.
        index: usize,
        /// Number of parameters supplied.
        available: usize,
    },

    /// The mode letter is not in PREFIX or any CHANMODES category.
    #[error("unknown mode {0:?}")]
    UnknownMode(char),

    /// A requested mode token was not `+x`, `-x` or a bare letter.
    #[error("invalid mode token {0:?}")]
    InvalidToken(String),

    /// The user directory could not resolve a status target.
    #[error("unknown user {nick:?} for mode {mode:?}")]
    UnknownUser {
        /// Status mode letter.
        mode: char,
        /// Nickname that failed to resolve.
        nick: String,
    },
}

/// Errors encountered when parsing inbound IRC lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Parsing failed with context information.
    #[error("parsing failed at position {position}: {context}")]
    ParseContext {
        /// Byte position where parsing failed.
        position: usize,
        /// Description of what was being parsed.
        context: String,
    },
}
