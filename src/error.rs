//! Error taxonomy for a typing run

/// Error type for typing operations
#[derive(Debug, Clone, PartialEq)]
pub enum TypingError {
    /// The clipboard (or source file) held no text
    EmptyClipboard,
    /// The clipboard could not be read
    Clipboard(String),
    /// A keystroke primitive failed on the host
    Synthesis(String),
    /// The user interrupted the run
    Cancelled,
    /// The configuration file could not be loaded
    Config(String),
}

impl TypingError {
    /// Process exit status reported for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            TypingError::Cancelled => 130,
            _ => 1,
        }
    }

    /// Whether partially typed content may remain in the host editor
    pub fn left_partial_output(&self) -> bool {
        matches!(self, TypingError::Cancelled | TypingError::Synthesis(_))
    }
}

impl std::fmt::Display for TypingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypingError::EmptyClipboard => write!(f, "Clipboard is empty"),
            TypingError::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),
            TypingError::Synthesis(msg) => write!(f, "Input synthesis error: {}", msg),
            TypingError::Cancelled => write!(f, "Typing interrupted by user"),
            TypingError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for TypingError {}
