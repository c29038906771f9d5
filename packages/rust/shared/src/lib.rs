//! Shared types, error model, and configuration for Scout.
//!
//! This crate is the foundation depended on by all other Scout crates.
//! It provides:
//! - Stage errors ([`FetchError`], [`ContextError`], [`AnalysisError`], [`LogError`])
//!   and [`ScoutError`] for configuration/I/O
//! - Pipeline entities ([`ExtractedContent`], [`ProjectContext`], [`RelevanceVerdict`],
//!   [`ReviewRecord`])
//! - Configuration ([`AppConfig`] and the per-stage runtime configs)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnalyzerConfig, AnalyzerSection, AppConfig, FetchConfig, FetchSection, LibraryBackend,
    LibraryConfig, LibrarySection, LogConfig, LogsSection, ProviderKind, config_dir,
    config_file_path, expand_tilde, init_config, load_config, load_config_from,
    resolve_api_key,
};
pub use error::{
    AnalysisError, AnalysisFailure, ContextError, ContextFailure, FetchError, FetchFailure,
    LogError, LogFailure, Result, ScoutError,
};
pub use types::{
    ContentType, ExtractedContent, ProjectContext, ProjectSummary, Relevance, RelevanceVerdict,
    ReviewDraft, ReviewRecord, ReviewRequest, SupplementaryKind, SupplementaryText,
};
