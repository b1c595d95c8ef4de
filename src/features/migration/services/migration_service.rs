use chrono::Utc;
use futures::TryStreamExt;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::error::{AppError, Result};
use crate::features::migration::models::DocumentRecord;
use crate::features::migration::services::DocumentSource;
use crate::modules::storage::{
    Metadata, ProviderKind, StorageError, StorageGateway, UploadFile,
};
use crate::shared::constants::{
    DEFAULT_CONTENT_TYPE, META_DOCUMENT_TYPE, META_ENTITY_ID, META_MIGRATED_AT,
    META_ORGANIZATION_ID, META_ORIGINAL_NAME,
};

const FILE_NOT_FOUND_LOCALLY: &str = "file not found locally";

#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationOptions {
    /// Read and check every document without writing to the target
    pub dry_run: bool,
    /// Remove the local copy after a successful upload
    pub delete_source: bool,
    /// Maximum number of records to process
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFailure {
    pub document_id: String,
    pub path: String,
    pub reason: String,
}

/// Outcome of one migration run
///
/// In a dry run `succeeded` counts documents that would have been migrated.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub bytes_written: u64,
    pub failures: Vec<MigrationFailure>,
    pub dry_run: bool,
}

impl MigrationReport {
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn log_summary(&self) {
        let label = if self.dry_run { "Dry run" } else { "Migration" };
        info!(
            "{} complete: success={}, errors={}, total={}, bytes_written={}",
            label, self.succeeded, self.failed, self.total, self.bytes_written
        );
        for failure in &self.failures {
            warn!(
                document_id = %failure.document_id,
                path = %failure.path,
                "Document not migrated: {}",
                failure.reason
            );
        }
    }

    fn record_failure(&mut self, record: &DocumentRecord, reason: impl Into<String>) {
        self.failed += 1;
        self.failures.push(MigrationFailure {
            document_id: record.id.clone(),
            path: record.file_path.clone(),
            reason: reason.into(),
        });
    }
}

/// Copies documents from local storage into another provider
///
/// Uses both gateways as an ordinary caller. Documents are processed one at a
/// time and a failing document never aborts the run.
pub struct MigrationService {
    source: Arc<dyn DocumentSource>,
    local: Arc<StorageGateway>,
    target: Arc<StorageGateway>,
}

impl MigrationService {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        local: Arc<StorageGateway>,
        target: Arc<StorageGateway>,
    ) -> Self {
        Self {
            source,
            local,
            target,
        }
    }

    pub async fn run(&self, options: MigrationOptions) -> Result<MigrationReport> {
        if self.target.provider_kind() == ProviderKind::Local {
            return Err(AppError::BadRequest(
                "Migration target must be a remote provider".to_string(),
            ));
        }

        let records = self.source.fetch_documents(options.limit).await?;
        info!(
            "Migrating {} documents from local to '{}'{}",
            records.len(),
            self.target.provider_kind(),
            if options.dry_run { " (dry run)" } else { "" }
        );

        let mut report = MigrationReport {
            total: records.len(),
            dry_run: options.dry_run,
            ..Default::default()
        };

        for record in &records {
            match self.migrate_document(record, options).await {
                Ok(bytes) => {
                    report.succeeded += 1;
                    report.bytes_written += bytes;
                }
                Err(reason) => {
                    warn!(
                        "Failed to migrate document {} ({}): {}",
                        record.id, record.file_path, reason
                    );
                    report.record_failure(record, reason);
                }
            }
        }

        Ok(report)
    }

    /// Returns the number of bytes written to the target
    async fn migrate_document(
        &self,
        record: &DocumentRecord,
        options: MigrationOptions,
    ) -> std::result::Result<u64, String> {
        let path = record.storage_path();
        if path.is_empty() {
            return Err("empty file path".to_string());
        }

        let data = self.read_local(path).await?;
        let content_type = record
            .mime_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);
        let metadata = migration_metadata(record);

        if options.dry_run {
            debug!(
                "Dry run: would upload {} ({} bytes, {})",
                path,
                data.len(),
                content_type
            );
            return Ok(0);
        }

        let file = UploadFile::new(data, content_type, record.original_name());
        let result = self
            .target
            .upload(file, path, Some(&metadata))
            .await
            .map_err(|e| format!("upload failed: {}", e))?;
        info!("Migrated {} ({} bytes)", result.path, result.size);

        if options.delete_source {
            // The copy on the target is authoritative at this point
            if let Err(e) = self.local.delete(path).await {
                warn!("Migrated {} but could not delete local copy: {}", path, e);
            }
        }

        Ok(result.size)
    }

    async fn read_local(&self, path: &str) -> std::result::Result<Vec<u8>, String> {
        let stream = self.local.download(path).await.map_err(local_read_reason)?;
        let chunks: Vec<bytes::Bytes> = stream.try_collect().await.map_err(local_read_reason)?;
        Ok(chunks.concat())
    }
}

fn local_read_reason(err: StorageError) -> String {
    if err.is_not_found() {
        FILE_NOT_FOUND_LOCALLY.to_string()
    } else {
        format!("local read failed: {}", err)
    }
}

fn migration_metadata(record: &DocumentRecord) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(
        META_ORGANIZATION_ID.to_string(),
        record.organization_id.clone(),
    );
    if let Some(entity_id) = &record.entity_id {
        metadata.insert(META_ENTITY_ID.to_string(), entity_id.clone());
    }
    if let Some(document_type) = &record.document_type {
        metadata.insert(META_DOCUMENT_TYPE.to_string(), document_type.clone());
    }
    metadata.insert(
        META_ORIGINAL_NAME.to_string(),
        record.original_name().to_string(),
    );
    metadata.insert(META_MIGRATED_AT.to_string(), Utc::now().to_rfc3339());
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::{
        ByteStream, ListedFile, StorageProvider, StorageResult, UploadResult,
    };
    use crate::shared::test_helpers::local_gateway;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticSource(Vec<DocumentRecord>);

    #[async_trait]
    impl DocumentSource for StaticSource {
        async fn fetch_documents(&self, limit: Option<i64>) -> Result<Vec<DocumentRecord>> {
            let take = limit.map(|l| l as usize).unwrap_or(self.0.len());
            Ok(self.0.iter().take(take).cloned().collect())
        }
    }

    /// Remote stand-in that records uploads in memory
    #[derive(Default)]
    struct RecordingStorage {
        uploads: Arc<Mutex<Vec<(String, u64, Metadata)>>>,
    }

    #[async_trait]
    impl StorageProvider for RecordingStorage {
        fn kind(&self) -> ProviderKind {
            ProviderKind::S3
        }

        async fn upload(
            &self,
            file: UploadFile,
            path: &str,
            metadata: &Metadata,
        ) -> StorageResult<UploadResult> {
            self.uploads
                .lock()
                .unwrap()
                .push((path.to_string(), file.size, metadata.clone()));
            Ok(UploadResult {
                path: path.to_string(),
                url: format!("s3://test/{}", path),
                size: file.size,
            })
        }

        async fn download(&self, path: &str) -> StorageResult<ByteStream> {
            Err(StorageError::NotFound {
                path: path.to_string(),
            })
        }

        async fn delete(&self, _path: &str) -> StorageResult<bool> {
            Ok(true)
        }

        async fn get_signed_url(&self, path: &str, _expires_in_secs: u64) -> StorageResult<String> {
            Ok(format!("s3://test/{}", path))
        }

        async fn list(&self, _prefix: &str) -> StorageResult<Vec<ListedFile>> {
            Ok(Vec::new())
        }

        async fn move_file(&self, _old_path: &str, _new_path: &str) -> StorageResult<bool> {
            Ok(true)
        }
    }

    fn record(id: &str, file_path: &str) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            organization_id: "org1".to_string(),
            entity_id: Some("entity1".to_string()),
            document_type: Some("policy".to_string()),
            file_path: file_path.to_string(),
            file_name: None,
            mime_type: Some("text/plain".to_string()),
        }
    }

    async fn setup() -> (
        tempfile::TempDir,
        Arc<StorageGateway>,
        Arc<Mutex<Vec<(String, u64, Metadata)>>>,
        MigrationService,
    ) {
        let (dir, local) = local_gateway().await;
        for path in ["org1/entity1/policy/a_1.txt", "org1/entity1/policy/b_2.txt"] {
            local
                .upload(UploadFile::new(&b"evidence"[..], "text/plain", "x.txt"), path, None)
                .await
                .unwrap();
        }

        let recording = RecordingStorage::default();
        let uploads = recording.uploads.clone();
        let target = Arc::new(StorageGateway::new(Box::new(recording)));
        let source = StaticSource(vec![
            record("1", "org1/entity1/policy/a_1.txt"),
            record("2", "/uploads/org1/entity1/policy/b_2.txt"),
            record("3", "org1/entity1/policy/missing_3.txt"),
        ]);

        let service = MigrationService::new(Arc::new(source), local.clone(), target);
        (dir, local, uploads, service)
    }

    #[tokio::test]
    async fn test_dry_run_reports_missing_files_without_writing() {
        let (_dir, _local, uploads, service) = setup().await;

        let report = service
            .run(MigrationOptions {
                dry_run: true,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(report.dry_run);
        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.bytes_written, 0);
        assert_eq!(report.failures[0].document_id, "3");
        assert_eq!(report.failures[0].reason, "file not found locally");
        assert!(uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_migration_uploads_with_metadata_and_keeps_paths() {
        let (_dir, _local, uploads, service) = setup().await;

        let report = service.run(MigrationOptions::default()).await.unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.bytes_written, 16);

        let uploads = uploads.lock().unwrap();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[1].0, "org1/entity1/policy/b_2.txt");
        let metadata = &uploads[0].2;
        assert_eq!(metadata.get("organizationId").unwrap(), "org1");
        assert_eq!(metadata.get("entityId").unwrap(), "entity1");
        assert_eq!(metadata.get("documentType").unwrap(), "policy");
        assert_eq!(metadata.get("originalName").unwrap(), "a_1.txt");
        assert!(metadata.contains_key("migratedAt"));
    }

    #[tokio::test]
    async fn test_delete_source_removes_local_copies() {
        let (_dir, local, _uploads, service) = setup().await;

        service
            .run(MigrationOptions {
                delete_source: true,
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(local.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_limit_bounds_the_batch() {
        let (_dir, _local, _uploads, service) = setup().await;

        let report = service
            .run(MigrationOptions {
                dry_run: true,
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(report.total, 1);
        assert_eq!(report.succeeded, 1);
    }

    #[tokio::test]
    async fn test_local_target_is_rejected() {
        let (_dir, local) = local_gateway().await;
        let service = MigrationService::new(
            Arc::new(StaticSource(Vec::new())),
            local.clone(),
            local,
        );

        assert!(service.run(MigrationOptions::default()).await.is_err());
    }
}
