//! # Namespace Oracle Trait
//!
//! The contract between the compiler and whatever knows which names exist in
//! a namespace and which values an annotation accepts. Lookups may block or
//! fail; every failure is reported as [`Error::Oracle`](crate::Error::Oracle)
//! and only rejects the statement that triggered it.
//!
//! ## Implementations
//!
//! | Oracle | Module | Description |
//! |--------|--------|-------------|
//! | `MemoryOracle` | `memory` | In-memory value sets for testing/embedding |

pub mod memory;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::Result;

pub use memory::MemoryOracle;

/// Namespace and annotation vocabulary lookups.
pub trait NamespaceOracle: Send + Sync {
    /// Whether the namespace keyword is known at all.
    fn has_namespace(&self, namespace: &str) -> Result<bool>;

    fn is_member(&self, namespace: &str, name: &str) -> Result<bool>;

    fn has_annotation(&self, annotation: &str) -> Result<bool>;

    /// The full value set of an annotation keyword.
    fn annotation_values(&self, annotation: &str) -> Result<BTreeSet<String>>;

    fn is_annotation_value(&self, annotation: &str, value: &str) -> Result<bool> {
        Ok(self.annotation_values(annotation)?.contains(value))
    }
}

impl<T: NamespaceOracle + ?Sized> NamespaceOracle for &T {
    fn has_namespace(&self, namespace: &str) -> Result<bool> {
        (**self).has_namespace(namespace)
    }
    fn is_member(&self, namespace: &str, name: &str) -> Result<bool> {
        (**self).is_member(namespace, name)
    }
    fn has_annotation(&self, annotation: &str) -> Result<bool> {
        (**self).has_annotation(annotation)
    }
    fn annotation_values(&self, annotation: &str) -> Result<BTreeSet<String>> {
        (**self).annotation_values(annotation)
    }
    fn is_annotation_value(&self, annotation: &str, value: &str) -> Result<bool> {
        (**self).is_annotation_value(annotation, value)
    }
}

impl<T: NamespaceOracle + ?Sized> NamespaceOracle for Arc<T> {
    fn has_namespace(&self, namespace: &str) -> Result<bool> {
        (**self).has_namespace(namespace)
    }
    fn is_member(&self, namespace: &str, name: &str) -> Result<bool> {
        (**self).is_member(namespace, name)
    }
    fn has_annotation(&self, annotation: &str) -> Result<bool> {
        (**self).has_annotation(annotation)
    }
    fn annotation_values(&self, annotation: &str) -> Result<BTreeSet<String>> {
        (**self).annotation_values(annotation)
    }
    fn is_annotation_value(&self, annotation: &str, value: &str) -> Result<bool> {
        (**self).is_annotation_value(annotation, value)
    }
}

impl<T: NamespaceOracle + ?Sized> NamespaceOracle for Box<T> {
    fn has_namespace(&self, namespace: &str) -> Result<bool> {
        (**self).has_namespace(namespace)
    }
    fn is_member(&self, namespace: &str, name: &str) -> Result<bool> {
        (**self).is_member(namespace, name)
    }
    fn has_annotation(&self, annotation: &str) -> Result<bool> {
        (**self).has_annotation(annotation)
    }
    fn annotation_values(&self, annotation: &str) -> Result<BTreeSet<String>> {
        (**self).annotation_values(annotation)
    }
    fn is_annotation_value(&self, annotation: &str, value: &str) -> Result<bool> {
        (**self).is_annotation_value(annotation, value)
    }
}
