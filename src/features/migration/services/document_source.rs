use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::migration::models::DocumentRecord;

/// Supplies the document records a migration run walks over
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Records with a non-empty `file_path`, oldest first, at most `limit` when given
    async fn fetch_documents(&self, limit: Option<i64>) -> Result<Vec<DocumentRecord>>;
}

/// Reads document records from Postgres
pub struct PgDocumentSource {
    pool: PgPool,
}

impl PgDocumentSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentSource for PgDocumentSource {
    async fn fetch_documents(&self, limit: Option<i64>) -> Result<Vec<DocumentRecord>> {
        let documents = sqlx::query_as::<_, DocumentRecord>(
            r#"
            SELECT id::text AS id,
                   organization_id::text AS organization_id,
                   entity_id::text AS entity_id,
                   document_type,
                   file_path,
                   file_name,
                   mime_type
            FROM documents
            WHERE file_path IS NOT NULL AND file_path <> ''
            ORDER BY id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch documents for migration: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(documents)
    }
}
