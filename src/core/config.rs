use std::env;
use std::path::PathBuf;

use crate::modules::storage::ProviderKind;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Storage backend selection. Only the selected provider's settings are read.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub provider: ProviderConfig,
}

/// Settings for exactly one storage provider
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Local(LocalStorageConfig),
    S3(S3Config),
    Azure(AzureConfig),
    Gcs(GcsConfig),
}

#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    /// Root directory files are written under
    pub upload_path: PathBuf,
    /// URL prefix local files are served from
    pub public_url_prefix: String,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: String,
    /// S3-compatible endpoint (e.g. MinIO); switches to path-style requests
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AzureConfig {
    pub connection_string: String,
    pub container: String,
}

#[derive(Debug, Clone)]
pub struct GcsConfig {
    pub project_id: Option<String>,
    pub key_file: Option<PathBuf>,
    pub bucket: String,
}

/// Environment lookup used by the storage config parsers
type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

fn env_lookup(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn required(lookup: Lookup<'_>, key: &str) -> Result<String, String> {
    lookup(key).ok_or_else(|| format!("{} environment variable is required", key))
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 60 * 1024 * 1024; // 60MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "GRC Storage API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Document storage API for the GRC platform".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    const DEFAULT_PROVIDER: &'static str = "local";

    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: Lookup<'_>) -> Result<Self, String> {
        let kind = lookup("STORAGE_PROVIDER")
            .unwrap_or_else(|| Self::DEFAULT_PROVIDER.to_string())
            .parse::<ProviderKind>()
            .map_err(|e| e.to_string())?;

        Ok(Self {
            provider: ProviderConfig::from_lookup(kind, lookup)?,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }
}

impl ProviderConfig {
    /// Read the settings for `kind`, regardless of `STORAGE_PROVIDER`
    pub fn from_env_for(kind: ProviderKind) -> Result<Self, String> {
        Self::from_lookup(kind, &env_lookup)
    }

    fn from_lookup(kind: ProviderKind, lookup: Lookup<'_>) -> Result<Self, String> {
        Ok(match kind {
            ProviderKind::Local => ProviderConfig::Local(LocalStorageConfig::from_lookup(lookup)),
            ProviderKind::S3 => ProviderConfig::S3(S3Config::from_lookup(lookup)?),
            ProviderKind::Azure => ProviderConfig::Azure(AzureConfig::from_lookup(lookup)?),
            ProviderKind::Gcs => ProviderConfig::Gcs(GcsConfig::from_lookup(lookup)?),
        })
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::Local(_) => ProviderKind::Local,
            ProviderConfig::S3(_) => ProviderKind::S3,
            ProviderConfig::Azure(_) => ProviderKind::Azure,
            ProviderConfig::Gcs(_) => ProviderKind::Gcs,
        }
    }
}

impl LocalStorageConfig {
    const DEFAULT_UPLOAD_PATH: &'static str = "./uploads";
    pub const PUBLIC_URL_PREFIX: &'static str = "/uploads";

    pub fn from_env() -> Self {
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        let upload_path = lookup("LOCAL_UPLOAD_PATH")
            .unwrap_or_else(|| Self::DEFAULT_UPLOAD_PATH.to_string());

        Self {
            upload_path: PathBuf::from(upload_path),
            public_url_prefix: Self::PUBLIC_URL_PREFIX.to_string(),
        }
    }

    pub fn new(upload_path: impl Into<PathBuf>) -> Self {
        Self {
            upload_path: upload_path.into(),
            public_url_prefix: Self::PUBLIC_URL_PREFIX.to_string(),
        }
    }
}

impl S3Config {
    const DEFAULT_REGION: &'static str = "us-east-1";

    fn from_lookup(lookup: Lookup<'_>) -> Result<Self, String> {
        Ok(Self {
            region: lookup("AWS_REGION").unwrap_or_else(|| Self::DEFAULT_REGION.to_string()),
            access_key_id: lookup("AWS_ACCESS_KEY_ID"),
            secret_access_key: lookup("AWS_SECRET_ACCESS_KEY"),
            bucket: required(lookup, "AWS_S3_BUCKET")?,
            endpoint: lookup("AWS_S3_ENDPOINT"),
        })
    }
}

impl AzureConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self, String> {
        Ok(Self {
            connection_string: required(lookup, "AZURE_STORAGE_CONNECTION_STRING")?,
            container: required(lookup, "AZURE_STORAGE_CONTAINER")?,
        })
    }
}

impl GcsConfig {
    fn from_lookup(lookup: Lookup<'_>) -> Result<Self, String> {
        Ok(Self {
            project_id: lookup("GCS_PROJECT_ID"),
            key_file: lookup("GCS_KEY_FILE").map(PathBuf::from),
            bucket: required(lookup, "GCS_BUCKET_NAME")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_storage_config_defaults_to_local() {
        let lookup = lookup_from(&[]);
        let config = StorageConfig::from_lookup(&lookup).unwrap();

        match config.provider {
            ProviderConfig::Local(local) => {
                assert_eq!(local.upload_path, PathBuf::from("./uploads"));
                assert_eq!(local.public_url_prefix, "/uploads");
            }
            other => panic!("expected local provider, got {:?}", other),
        }
    }

    #[test]
    fn test_storage_config_reads_s3_settings() {
        let lookup = lookup_from(&[
            ("STORAGE_PROVIDER", "s3"),
            ("AWS_REGION", "eu-west-1"),
            ("AWS_ACCESS_KEY_ID", "AKIA"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_S3_BUCKET", "grc-documents"),
        ]);
        let config = StorageConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.kind(), ProviderKind::S3);

        let ProviderConfig::S3(s3) = config.provider else {
            panic!("expected s3 provider");
        };
        assert_eq!(s3.region, "eu-west-1");
        assert_eq!(s3.bucket, "grc-documents");
        assert_eq!(s3.access_key_id.as_deref(), Some("AKIA"));
        assert!(s3.endpoint.is_none());
    }

    #[test]
    fn test_storage_config_requires_bucket_for_cloud_providers() {
        let lookup = lookup_from(&[("STORAGE_PROVIDER", "gcs")]);
        let err = StorageConfig::from_lookup(&lookup).unwrap_err();
        assert!(err.contains("GCS_BUCKET_NAME"));

        let lookup = lookup_from(&[
            ("STORAGE_PROVIDER", "azure"),
            ("AZURE_STORAGE_CONTAINER", "documents"),
        ]);
        let err = StorageConfig::from_lookup(&lookup).unwrap_err();
        assert!(err.contains("AZURE_STORAGE_CONNECTION_STRING"));
    }

    #[test]
    fn test_storage_config_rejects_unknown_provider() {
        let lookup = lookup_from(&[("STORAGE_PROVIDER", "dropbox")]);
        assert!(StorageConfig::from_lookup(&lookup).is_err());
    }

    #[test]
    fn test_provider_config_ignores_selector() {
        let lookup = lookup_from(&[
            ("STORAGE_PROVIDER", "s3"),
            ("LOCAL_UPLOAD_PATH", "/srv/uploads"),
        ]);
        let config = ProviderConfig::from_lookup(ProviderKind::Local, &lookup).unwrap();
        assert_eq!(config.kind(), ProviderKind::Local);
    }
}
