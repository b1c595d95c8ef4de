mod document_storage_service;

pub use document_storage_service::*;
