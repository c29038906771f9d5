//! Error types for Scout.
//!
//! Each pipeline stage has its own error struct carrying a machine-readable
//! reason and a human message. [`ScoutError`] covers configuration and I/O
//! problems outside the pipeline. App crates wrap these with `color-eyre`.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ScoutError
// ---------------------------------------------------------------------------

/// Top-level error type for configuration and filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad identifier, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage errors
// ---------------------------------------------------------------------------

/// Declares a stage error: a reason enum plus a struct pairing it with a message.
macro_rules! stage_error {
    (
        $(#[$meta:meta])*
        $name:ident, $reason:ident, $stage:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $tag:literal, $ctor:ident; )+
        }
    ) => {
        #[doc = concat!("Reason codes for [`", stringify!($name), "`].")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $reason {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $reason {
            /// Stable snake_case code, as exposed to callers.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $tag, )+
                }
            }
        }

        impl fmt::Display for $reason {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        #[error("{stage} failed ({reason}): {message}", stage = $stage)]
        pub struct $name {
            /// Machine-readable failure reason.
            pub reason: $reason,
            /// Human-readable detail.
            pub message: String,
        }

        impl $name {
            /// Build an error with an explicit reason.
            pub fn new(reason: $reason, msg: impl Into<String>) -> Self {
                Self {
                    reason,
                    message: msg.into(),
                }
            }

            $(
                #[doc = concat!("Shorthand for a `", $tag, "` error.")]
                pub fn $ctor(msg: impl Into<String>) -> Self {
                    Self::new($reason::$variant, msg)
                }
            )+
        }
    };
}

stage_error! {
    /// The content fetcher could not produce usable text for a URL.
    FetchError, FetchFailure, "fetch" {
        /// Network failure, non-success status, or timeout.
        Unreachable => "unreachable", unreachable;
        /// The URL matches no known content pattern.
        Unsupported => "unsupported", unsupported;
        /// Extraction produced no (or too little) text.
        Empty => "empty", empty;
    }
}

stage_error! {
    /// The context loader could not assemble a project's context.
    ContextError, ContextFailure, "context loading" {
        /// No project directory matches the identifier.
        NotFound => "not_found", not_found;
        /// The project exists but has no specification document.
        MissingSpec => "missing_spec", missing_spec;
        /// The project library itself could not be read.
        Unavailable => "unavailable", unavailable;
    }
}

stage_error! {
    /// The relevance analyzer could not produce a verdict.
    AnalysisError, AnalysisFailure, "analysis" {
        /// The model call failed, timed out, or returned an unreadable envelope.
        ProviderUnavailable => "provider_unavailable", provider_unavailable;
        /// The model's text did not match the verdict schema.
        MalformedResponse => "malformed_response", malformed_response;
    }
}

stage_error! {
    /// The research log could not be written or read.
    LogError, LogFailure, "research log" {
        /// Appending the record failed.
        WriteFailed => "write_failed", write_failed;
        /// Reading back the log failed.
        ReadFailed => "read_failed", read_failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ScoutError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = ScoutError::validation("project id contains '/'");
        assert!(err.to_string().contains("contains '/'"));
    }

    #[test]
    fn stage_error_display_includes_reason() {
        let err = FetchError::empty("body had 3 characters");
        assert_eq!(err.reason, FetchFailure::Empty);
        assert_eq!(err.to_string(), "fetch failed (empty): body had 3 characters");

        let err = ContextError::missing_spec("no spec.md");
        assert_eq!(
            err.to_string(),
            "context loading failed (missing_spec): no spec.md"
        );
    }

    #[test]
    fn reasons_serialize_as_snake_case() {
        let json = serde_json::to_string(&AnalysisFailure::MalformedResponse).unwrap();
        assert_eq!(json, r#""malformed_response""#);
        assert_eq!(LogFailure::WriteFailed.as_str(), "write_failed");
        assert_eq!(ContextFailure::NotFound.to_string(), "not_found");
    }
}
