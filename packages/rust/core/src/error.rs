//! Orchestrator error: which stage failed, and why.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use scout_shared::{AnalysisError, ContextError, FetchError, LogError};

/// Pipeline stage a [`ReviewError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    /// The request was rejected before any stage ran.
    Request,
    Fetch,
    Context,
    Analysis,
    Log,
}

impl ReviewStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Fetch => "fetch",
            Self::Context => "context",
            Self::Analysis => "analysis",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed review. Stage errors are carried unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Log(#[from] LogError),
}

impl ReviewError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn stage(&self) -> ReviewStage {
        match self {
            Self::InvalidRequest(_) => ReviewStage::Request,
            Self::Fetch(_) => ReviewStage::Fetch,
            Self::Context(_) => ReviewStage::Context,
            Self::Analysis(_) => ReviewStage::Analysis,
            Self::Log(_) => ReviewStage::Log,
        }
    }

    /// The stage's snake_case reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Fetch(e) => e.reason.as_str(),
            Self::Context(e) => e.reason.as_str(),
            Self::Analysis(e) => e.reason.as_str(),
            Self::Log(e) => e.reason.as_str(),
        }
    }
}
