#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use tempfile::TempDir;

#[cfg(test)]
use crate::core::config::{LocalStorageConfig, ProviderConfig};
#[cfg(test)]
use crate::modules::storage::{ByteStream, StorageGateway};

/// Gateway over a fresh temporary upload directory. Keep the `TempDir` alive
/// for as long as the gateway is used.
#[cfg(test)]
pub async fn local_gateway() -> (TempDir, Arc<StorageGateway>) {
    let dir = TempDir::new().unwrap();
    let gateway = StorageGateway::for_provider(&ProviderConfig::Local(LocalStorageConfig::new(
        dir.path(),
    )))
    .await
    .unwrap();
    (dir, Arc::new(gateway))
}

#[cfg(test)]
pub async fn collect_bytes(stream: ByteStream) -> Vec<u8> {
    use futures::TryStreamExt;

    let chunks: Vec<bytes::Bytes> = stream.try_collect().await.unwrap();
    chunks.concat()
}
