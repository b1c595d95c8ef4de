// =============================================================================
// DOCUMENT METADATA KEYS
// =============================================================================

/// Organization owning the document
pub const META_ORGANIZATION_ID: &str = "organizationId";

/// Entity (control, task, audit, ...) the document is attached to
pub const META_ENTITY_ID: &str = "entityId";

/// Document category such as `policy` or `evidence`
pub const META_DOCUMENT_TYPE: &str = "documentType";

/// Filename as uploaded by the user
pub const META_ORIGINAL_NAME: &str = "originalName";

/// RFC 3339 timestamp set by the storage migration tool
pub const META_MIGRATED_AT: &str = "migratedAt";

/// Content type used when none was declared
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
