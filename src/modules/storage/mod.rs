//! Storage module for document files
//!
//! One capability interface ([`StorageProvider`]) with local filesystem, S3,
//! Azure Blob and Google Cloud Storage implementations, fronted by a
//! [`StorageGateway`] that owns the provider selected at startup.

mod azure;
mod error;
mod gateway;
mod gcs;
mod local;
mod object_store_ops;
mod object_store_storage;
mod path;
mod provider;
mod s3;

pub use azure::{AzureBlobStorage, AzureConnectionString};
pub use error::{StorageError, StorageResult};
pub use gateway::{build_provider, StorageGateway};
pub use gcs::GcsStorage;
pub use local::LocalStorage;
pub use object_store_storage::ObjectStoreStorage;
pub use path::{build_file_path, generate_file_path};
pub use provider::{
    file_name_of, ByteStream, ListedFile, Metadata, ProviderKind, StorageProvider, UploadFile,
    UploadResult, DEFAULT_SIGNED_URL_EXPIRY_SECS,
};
pub use s3::S3Storage;
