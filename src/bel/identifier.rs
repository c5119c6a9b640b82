//! Identifier and annotation resolution.
//!
//! Names are checked against the document's own definitions first
//! (`LIST` / `PATTERN`), then against the namespace oracle.

use std::collections::BTreeSet;

use super::ast::Statement;
use super::metadata::{Definition, Definitions};
use crate::model::Entity;
use crate::oracle::NamespaceOracle;
use crate::{Error, Result};

/// Validates entities and annotation values for one document.
pub struct Resolver<'a> {
    oracle: &'a dyn NamespaceOracle,
    definitions: &'a Definitions,
    allow_naked_names: bool,
    skip_validation: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(oracle: &'a dyn NamespaceOracle, definitions: &'a Definitions) -> Self {
        Self { oracle, definitions, allow_naked_names: false, skip_validation: false }
    }

    pub fn allow_naked_names(mut self, allow: bool) -> Self {
        self.allow_naked_names = allow;
        self
    }

    pub fn skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    /// Check one entity.
    pub fn validate(&self, entity: &Entity) -> Result<()> {
        let Some(namespace) = entity.namespace.as_deref() else {
            return if self.allow_naked_names {
                Ok(())
            } else {
                Err(Error::NakedName { name: entity.name.clone() })
            };
        };
        if entity.is_bel_default() || self.skip_validation {
            return Ok(());
        }

        let known = match self.definitions.namespace(namespace) {
            Some(definition) => match definition.accepts(&entity.name) {
                Some(valid) => valid,
                None => self.ask_oracle(namespace, &entity.name, definition)?,
            },
            None => {
                if !self.oracle.has_namespace(namespace)? {
                    return Err(Error::UndefinedNamespace { namespace: namespace.to_string() });
                }
                self.oracle.is_member(namespace, &entity.name)?
            }
        };

        if known {
            Ok(())
        } else {
            Err(Error::MissingNamespaceName {
                namespace: namespace.to_string(),
                name: entity.name.clone(),
            })
        }
    }

    fn ask_oracle(&self, namespace: &str, name: &str, definition: &Definition) -> Result<bool> {
        if !self.oracle.has_namespace(namespace)? {
            return Err(Error::Oracle(format!(
                "namespace {namespace} is defined as {definition} but is not loaded"
            )));
        }
        self.oracle.is_member(namespace, name)
    }

    /// Check every entity a statement mentions.
    pub fn validate_statement(&self, statement: &Statement) -> Result<()> {
        for entity in statement.entities() {
            self.validate(entity)?;
        }
        Ok(())
    }

    /// The annotation keyword must be known and every value valid.
    pub fn check_annotation(&self, key: &str, values: &BTreeSet<String>) -> Result<()> {
        if self.skip_validation {
            return Ok(());
        }
        match self.definitions.annotation(key) {
            Some(definition @ (Definition::List(_) | Definition::Pattern { .. })) => {
                for value in values {
                    if definition.accepts(value) != Some(true) {
                        return Err(illegal_value(key, value));
                    }
                }
                Ok(())
            }
            Some(Definition::Url(_)) | None => {
                if !self.oracle.has_annotation(key)? {
                    return Err(Error::UndefinedAnnotation { annotation: key.to_string() });
                }
                for value in values {
                    if !self.oracle.is_annotation_value(key, value)? {
                        return Err(illegal_value(key, value));
                    }
                }
                Ok(())
            }
        }
    }
}

fn illegal_value(key: &str, value: &str) -> Error {
    Error::IllegalAnnotationValue { annotation: key.to_string(), value: value.to_string() }
}
