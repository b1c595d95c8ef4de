mod document_source;
mod migration_service;

pub use document_source::*;
pub use migration_service::*;
