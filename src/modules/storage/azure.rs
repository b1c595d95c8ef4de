//! Azure Blob Storage

use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
use tracing::info;

use super::error::{StorageError, StorageResult};
use super::object_store_storage::ObjectStoreStorage;
use super::provider::ProviderKind;
use crate::core::config::AzureConfig;

/// Well-known Azurite development account
const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Fields of an Azure storage connection string
/// (`DefaultEndpointsProtocol=https;AccountName=..;AccountKey=..;EndpointSuffix=..`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureConnectionString {
    pub protocol: String,
    pub account_name: String,
    pub account_key: Option<String>,
    pub endpoint_suffix: String,
    pub blob_endpoint: Option<String>,
    pub use_development_storage: bool,
}

impl AzureConnectionString {
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let mut protocol = "https".to_string();
        let mut account_name = None;
        let mut account_key = None;
        let mut endpoint_suffix = "core.windows.net".to_string();
        let mut blob_endpoint = None;
        let mut use_development_storage = false;

        for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // Account keys are base64 and may end in '='
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                StorageError::Config(format!("Malformed connection string segment '{}'", pair))
            })?;

            match key {
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "AccountName" => account_name = Some(value.to_string()),
                "AccountKey" => account_key = Some(value.to_string()),
                "EndpointSuffix" => endpoint_suffix = value.to_string(),
                "BlobEndpoint" => blob_endpoint = Some(value.trim_end_matches('/').to_string()),
                "UseDevelopmentStorage" => {
                    use_development_storage = value.eq_ignore_ascii_case("true")
                }
                _ => {}
            }
        }

        let account_name = match (account_name, use_development_storage) {
            (Some(name), _) => name,
            (None, true) => DEV_ACCOUNT_NAME.to_string(),
            (None, false) => {
                return Err(StorageError::Config(
                    "Azure connection string is missing AccountName".to_string(),
                ))
            }
        };

        Ok(Self {
            protocol,
            account_name,
            account_key,
            endpoint_suffix,
            blob_endpoint,
            use_development_storage,
        })
    }

    /// Base URL of the blob service for this account
    pub fn blob_service_url(&self) -> String {
        if let Some(endpoint) = &self.blob_endpoint {
            endpoint.clone()
        } else if self.use_development_storage {
            DEV_BLOB_ENDPOINT.to_string()
        } else {
            format!(
                "{}://{}.blob.{}",
                self.protocol, self.account_name, self.endpoint_suffix
            )
        }
    }
}

pub type AzureBlobStorage = ObjectStoreStorage<MicrosoftAzure>;

impl AzureBlobStorage {
    pub fn new(config: &AzureConfig) -> StorageResult<Self> {
        let connection = AzureConnectionString::parse(&config.connection_string)?;

        let mut builder = MicrosoftAzureBuilder::new()
            .with_account(&connection.account_name)
            .with_container_name(&config.container);

        if connection.use_development_storage {
            builder = builder.with_use_emulator(true);
        }
        if let Some(key) = &connection.account_key {
            builder = builder.with_access_key(key);
        }
        if let Some(endpoint) = &connection.blob_endpoint {
            builder = builder.with_endpoint(endpoint.clone());
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Credential(format!("Azure: {}", e)))?;

        info!(
            "Azure Blob storage initialized for account: {}, container: {}",
            connection.account_name, config.container
        );

        let container_url = format!("{}/{}", connection.blob_service_url(), config.container);
        Ok(Self::with_store(ProviderKind::Azure, store, container_url))
    }

    /// Public blob URL for a path
    pub fn blob_url(&self, path: &str) -> String {
        self.object_url(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_connection_string() {
        let conn = AzureConnectionString::parse(
            "DefaultEndpointsProtocol=https;AccountName=grcdocs;AccountKey=YWJjZA==;EndpointSuffix=core.windows.net",
        )
        .unwrap();

        assert_eq!(conn.account_name, "grcdocs");
        assert_eq!(conn.account_key.as_deref(), Some("YWJjZA=="));
        assert_eq!(conn.blob_service_url(), "https://grcdocs.blob.core.windows.net");
    }

    #[test]
    fn test_parse_development_storage() {
        let conn = AzureConnectionString::parse("UseDevelopmentStorage=true").unwrap();
        assert!(conn.use_development_storage);
        assert_eq!(conn.account_name, "devstoreaccount1");
        assert_eq!(
            conn.blob_service_url(),
            "http://127.0.0.1:10000/devstoreaccount1"
        );
    }

    #[test]
    fn test_parse_custom_blob_endpoint() {
        let conn = AzureConnectionString::parse(
            "AccountName=grcdocs;AccountKey=a2V5;BlobEndpoint=https://blob.example.test/",
        )
        .unwrap();
        assert_eq!(conn.blob_service_url(), "https://blob.example.test");
    }

    #[test]
    fn test_parse_rejects_missing_account() {
        assert!(AzureConnectionString::parse("AccountKey=a2V5").is_err());
        assert!(AzureConnectionString::parse("AccountName").is_err());
    }

    #[test]
    fn test_blob_url_includes_container() {
        use crate::modules::storage::StorageProvider;

        let storage = AzureBlobStorage::new(&AzureConfig {
            connection_string:
                "DefaultEndpointsProtocol=https;AccountName=grcdocs;AccountKey=YWJjZA==;EndpointSuffix=core.windows.net"
                    .to_string(),
            container: "documents".to_string(),
        })
        .unwrap();

        assert_eq!(storage.kind(), ProviderKind::Azure);
        assert_eq!(
            storage.blob_url("org1/e1/policy/p_1.pdf"),
            "https://grcdocs.blob.core.windows.net/documents/org1/e1/policy/p_1.pdf"
        );
    }
}
