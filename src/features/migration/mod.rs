//! Batch copy of locally stored documents into a remote provider.
//!
//! Driven by the `migrate-storage` binary. Paths are kept unchanged on the
//! target, so document rows need no update after a run.

pub mod models;
pub mod services;

pub use services::{
    DocumentSource, MigrationFailure, MigrationOptions, MigrationReport, MigrationService,
    PgDocumentSource,
};
