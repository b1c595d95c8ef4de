mod document_record;

pub use document_record::*;
