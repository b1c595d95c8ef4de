use sqlx::FromRow;

/// Row of the `documents` table as read by the migration tool
#[derive(Debug, Clone, FromRow)]
pub struct DocumentRecord {
    pub id: String,
    pub organization_id: String,
    pub entity_id: Option<String>,
    pub document_type: Option<String>,
    pub file_path: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl DocumentRecord {
    /// Storage path relative to the upload root
    ///
    /// Older rows store the public URL (`/uploads/...`) rather than the bare path.
    pub fn storage_path(&self) -> &str {
        let path = self.file_path.trim().trim_start_matches('/');
        path.strip_prefix("uploads/").unwrap_or(path)
    }

    /// Name recorded as `originalName` on the migrated object
    pub fn original_name(&self) -> &str {
        self.file_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| crate::modules::storage::file_name_of(self.storage_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file_path: &str, file_name: Option<&str>) -> DocumentRecord {
        DocumentRecord {
            id: "1".to_string(),
            organization_id: "org1".to_string(),
            entity_id: Some("entity1".to_string()),
            document_type: Some("policy".to_string()),
            file_path: file_path.to_string(),
            file_name: file_name.map(str::to_string),
            mime_type: None,
        }
    }

    #[test]
    fn test_storage_path_strips_public_prefix() {
        assert_eq!(
            record("/uploads/org1/entity1/policy/a_1.pdf", None).storage_path(),
            "org1/entity1/policy/a_1.pdf"
        );
        assert_eq!(
            record("org1/entity1/policy/a_1.pdf", None).storage_path(),
            "org1/entity1/policy/a_1.pdf"
        );
    }

    #[test]
    fn test_original_name_falls_back_to_path() {
        assert_eq!(record("org1/a_1.pdf", Some("Access Policy.pdf")).original_name(), "Access Policy.pdf");
        assert_eq!(record("org1/a_1.pdf", Some("")).original_name(), "a_1.pdf");
        assert_eq!(record("org1/a_1.pdf", None).original_name(), "a_1.pdf");
    }
}
