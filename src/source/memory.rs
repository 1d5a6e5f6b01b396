use std::collections::{BTreeMap, HashSet};

use super::{ObjectInfo, ObjectSource};
use crate::error::RetrievalError;

/// Objects held in memory, with optional per-object fetch failures
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    objects: BTreeMap<String, Vec<u8>>,
    failing: HashSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.insert(name, body);
        self
    }

    /// List the object but fail every fetch of it
    pub fn with_failing_object(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.objects.entry(name.clone()).or_default();
        self.failing.insert(name);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.objects.insert(name.into(), body.into());
    }
}

impl ObjectSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} objects)", self.objects.len())
    }

    fn list_objects(&self) -> Result<Vec<ObjectInfo>, RetrievalError> {
        Ok(self
            .objects
            .iter()
            .map(|(name, body)| ObjectInfo {
                name: name.clone(),
                size: Some(body.len() as u64),
            })
            .collect())
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>, RetrievalError> {
        if self.failing.contains(name) {
            return Err(RetrievalError::Status {
                object: name.to_string(),
                status: 403,
            });
        }
        self.objects
            .get(name)
            .cloned()
            .ok_or_else(|| RetrievalError::NotFound(name.to_string()))
    }
}
