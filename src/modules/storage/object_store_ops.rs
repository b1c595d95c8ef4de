//! Operations shared by the `object_store`-backed providers (Azure Blob, GCS)

use std::time::Duration;

use axum::http::Method;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectMeta, ObjectStore, PutOptions, PutPayload};

use super::error::{StorageError, StorageResult};
use super::provider::{ByteStream, ListedFile, Metadata, ProviderKind, UploadFile};

/// Parse a storage path into an object key
pub fn object_path(path: &str) -> StorageResult<ObjectPath> {
    ObjectPath::parse(path.trim_matches('/'))
        .map_err(|e| StorageError::InvalidPath(format!("'{}': {}", path, e)))
}

/// Content type and caller metadata as object attributes
pub fn attributes_for(file: &UploadFile, metadata: &Metadata) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, file.content_type.clone().into());
    for (key, value) in metadata {
        attributes.insert(Attribute::Metadata(key.clone().into()), value.clone().into());
    }
    attributes
}

pub async fn put<S: ObjectStore>(
    store: &S,
    provider: ProviderKind,
    path: &str,
    file: &UploadFile,
    metadata: &Metadata,
) -> StorageResult<()> {
    let location = object_path(path)?;
    let options = PutOptions {
        attributes: attributes_for(file, metadata),
        ..Default::default()
    };

    store
        .put_opts(&location, PutPayload::from(file.data.clone()), options)
        .await
        .map_err(|e| StorageError::from_object_store(provider, e))?;
    Ok(())
}

pub async fn get<S: ObjectStore>(
    store: &S,
    provider: ProviderKind,
    path: &str,
) -> StorageResult<ByteStream> {
    let location = object_path(path)?;
    let result = store
        .get(&location)
        .await
        .map_err(|e| StorageError::from_object_store(provider, e))?;

    let stream = result
        .into_stream()
        .map(move |chunk: object_store::Result<Bytes>| {
            chunk.map_err(|e| StorageError::from_object_store(provider, e))
        });
    Ok(stream.boxed())
}

pub async fn delete<S: ObjectStore>(
    store: &S,
    provider: ProviderKind,
    path: &str,
) -> StorageResult<()> {
    let location = object_path(path)?;
    store
        .delete(&location)
        .await
        .map_err(|e| StorageError::from_object_store(provider, e))
}

pub async fn list<S: ObjectStore>(
    store: &S,
    provider: ProviderKind,
    prefix: &str,
) -> StorageResult<Vec<ListedFile>> {
    let prefix = prefix.trim_matches('/');
    let prefix_path = if prefix.is_empty() {
        None
    } else {
        Some(object_path(prefix)?)
    };

    let mut objects: Vec<ObjectMeta> = store
        .list(prefix_path.as_ref())
        .try_collect()
        .await
        .map_err(|e| StorageError::from_object_store(provider, e))?;

    // Listing is by directory, so a prefix naming an object finds nothing under it
    if objects.is_empty() {
        if let Some(location) = &prefix_path {
            match store.head(location).await {
                Ok(meta) => objects.push(meta),
                Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(StorageError::from_object_store(provider, e)),
            }
        }
    }

    Ok(objects
        .into_iter()
        .map(|meta| ListedFile::new(meta.location.to_string(), meta.size, meta.last_modified))
        .collect())
}

/// Copy then delete the source. Both objects exist if the delete fails.
pub async fn copy_then_delete<S: ObjectStore>(
    store: &S,
    provider: ProviderKind,
    old_path: &str,
    new_path: &str,
) -> StorageResult<()> {
    let from = object_path(old_path)?;
    let to = object_path(new_path)?;

    store
        .copy(&from, &to)
        .await
        .map_err(|e| StorageError::from_object_store(provider, e))?;
    store
        .delete(&from)
        .await
        .map_err(|e| StorageError::from_object_store(provider, e))
}

/// Time-limited GET URL for one object
pub async fn signed_get_url<S: Signer>(
    store: &S,
    provider: ProviderKind,
    path: &str,
    expires_in_secs: u64,
) -> StorageResult<String> {
    let location = object_path(path)?;
    let url = store
        .signed_url(Method::GET, &location, Duration::from_secs(expires_in_secs))
        .await
        .map_err(|e| StorageError::from_object_store(provider, e))?;
    Ok(url.to_string())
}
