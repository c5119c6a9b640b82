//! In-memory namespace oracle.
//!
//! This is the reference implementation of `NamespaceOracle`.
//! Value sets live in HashMaps protected by RwLock, so one oracle can be
//! shared by many compilers and extended while they run.

use std::collections::BTreeSet;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;

use super::NamespaceOracle;
use crate::Result;

/// In-memory namespace and annotation vocabularies. Cloning shares the data.
#[derive(Clone, Default)]
pub struct MemoryOracle {
    inner: Arc<OracleInner>,
}

#[derive(Default)]
struct OracleInner {
    namespaces: RwLock<HashMap<String, HashSet<String>>>,
    annotations: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace<I, S>(self, namespace: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_namespace(namespace, names);
        self
    }

    pub fn with_annotation<I, S>(self, annotation: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_annotation(annotation, values);
        self
    }

    /// Add names to a namespace, creating it if needed.
    pub fn add_namespace<I, S>(&self, namespace: &str, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut namespaces = self.inner.namespaces.write();
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .extend(names.into_iter().map(Into::into));
    }

    pub fn add_annotation<I, S>(&self, annotation: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut annotations = self.inner.annotations.write();
        annotations
            .entry(annotation.to_string())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    pub fn namespace_count(&self) -> usize {
        self.inner.namespaces.read().len()
    }
}

impl std::fmt::Debug for MemoryOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryOracle")
            .field("namespaces", &self.inner.namespaces.read().len())
            .field("annotations", &self.inner.annotations.read().len())
            .finish()
    }
}

impl NamespaceOracle for MemoryOracle {
    fn has_namespace(&self, namespace: &str) -> Result<bool> {
        Ok(self.inner.namespaces.read().contains_key(namespace))
    }

    fn is_member(&self, namespace: &str, name: &str) -> Result<bool> {
        Ok(self
            .inner
            .namespaces
            .read()
            .get(namespace)
            .is_some_and(|names| names.contains(name)))
    }

    fn has_annotation(&self, annotation: &str) -> Result<bool> {
        Ok(self.inner.annotations.read().contains_key(annotation))
    }

    fn annotation_values(&self, annotation: &str) -> Result<BTreeSet<String>> {
        Ok(self.inner.annotations.read().get(annotation).cloned().unwrap_or_default())
    }

    fn is_annotation_value(&self, annotation: &str, value: &str) -> Result<bool> {
        Ok(self
            .inner
            .annotations
            .read()
            .get(annotation)
            .is_some_and(|values| values.contains(value)))
    }
}
