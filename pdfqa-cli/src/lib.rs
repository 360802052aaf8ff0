//! # pdfqa-cli
//!
//! The `pdfqa` command: ingest a PDF into pgvector, then ask questions about
//! it interactively or one at a time.

pub mod app;
pub mod chat;
pub mod settings;

pub use app::{build_answerer, ingest};
pub use settings::{Settings, SettingsError};
