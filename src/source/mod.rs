//! Pull-only access to the objects an ingestion run reads

pub mod client;
pub mod local;
pub mod memory;
pub mod retry;

pub use client::BucketClient;
pub use local::LocalDirSource;
pub use memory::MemorySource;

use crate::config::{RetryPolicy, SourceConfig};
use crate::error::RetrievalError;

/// A listed object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub name: String,
    pub size: Option<u64>,
}

pub trait ObjectSource {
    /// Human readable location, for logs and the run report
    fn describe(&self) -> String;

    fn list_objects(&self) -> Result<Vec<ObjectInfo>, RetrievalError>;

    fn fetch(&self, name: &str) -> Result<Vec<u8>, RetrievalError>;
}

impl<S: ObjectSource + ?Sized> ObjectSource for &S {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn list_objects(&self) -> Result<Vec<ObjectInfo>, RetrievalError> {
        (**self).list_objects()
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, RetrievalError> {
        (**self).fetch(name)
    }
}

impl<S: ObjectSource + ?Sized> ObjectSource for Box<S> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn list_objects(&self) -> Result<Vec<ObjectInfo>, RetrievalError> {
        (**self).list_objects()
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, RetrievalError> {
        (**self).fetch(name)
    }
}

/// Build the source described by a config
pub fn open_source(
    config: &SourceConfig,
    retry: RetryPolicy,
) -> anyhow::Result<Box<dyn ObjectSource>> {
    Ok(match config {
        SourceConfig::Bucket {
            endpoint,
            bucket,
            token,
        } => Box::new(BucketClient::new(endpoint, bucket, token.clone(), retry)?),
        SourceConfig::Directory(root) => Box::new(LocalDirSource::new(root.clone())?),
    })
}
