use thiserror::Error;

/// Sub-classification of malformed filter patterns, surfaced to the user
/// so broken input can be corrected without reading regex engine output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSyntaxKind {
    UnterminatedGroup,
    DanglingQuantifier,
    IllegalRepetition,
    Other,
}

impl PatternSyntaxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternSyntaxKind::UnterminatedGroup => "unterminated group",
            PatternSyntaxKind::DanglingQuantifier => "dangling quantifier",
            PatternSyntaxKind::IllegalRepetition => "illegal repetition",
            PatternSyntaxKind::Other => "invalid pattern",
        }
    }
}

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Remote request failed: {message}")]
    Transport { status: Option<u16>, message: String },

    #[error("Invalid filter pattern '{pattern}' ({}): {message}", .kind.as_str())]
    PatternSyntax {
        kind: PatternSyntaxKind,
        pattern: String,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },

    #[error("A sweep is already running for this selection")]
    Busy,

    #[error("Sweep worker failed: {message}")]
    Worker { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type Result<T> = std::result::Result<T, SweepError>;

impl SweepError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = match status {
            Some(code) => format!("HTTP {}: {}", code, message),
            None => message,
        };
        Self::Transport { status, message }
    }

    pub fn pattern_syntax(
        kind: PatternSyntaxKind,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PatternSyntax {
            kind,
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs {
            message: message.into(),
        }
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }
}

impl From<crate::config::ConfigError> for SweepError {
    fn from(error: crate::config::ConfigError) -> Self {
        SweepError::config_error(error.to_string())
    }
}
