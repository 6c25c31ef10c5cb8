//! Variable definitions and the per-context variable store

use crate::error::{ContextError, Result};
use crate::value::Variable;
use std::collections::HashMap;
use std::fmt;

static UNDEFINED: Variable = Variable::Undefined;

/// Identifies a variable by name; `a.b.c` addresses attribute `c` of `a.b`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableDefinition {
    name: String,
}

impl VariableDefinition {
    /// Create a definition, rejecting names that can never resolve
    ///
    /// The name must be non-empty and every `.`-separated segment must be
    /// non-empty, so a definition always has at least a root segment.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ContextError::MalformedDefinition {
                name,
                reason: "name is empty",
            });
        }
        if name.split('.').any(str::is_empty) {
            return Err(ContextError::MalformedDefinition {
                name,
                reason: "empty path segment",
            });
        }
        Ok(Self { name })
    }

    /// The full name, dots included
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root variable name (first segment)
    pub fn root(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    /// Attribute steps after the root, in access order
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.name.split('.').skip(1)
    }

    pub fn is_dotted(&self) -> bool {
        self.name.contains('.')
    }
}

impl fmt::Display for VariableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl std::str::FromStr for VariableDefinition {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Mapping from declared variable name to its current value
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    vars: HashMap<String, Variable>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a definition, degrading to `Undefined` on any miss
    ///
    /// Undotted names are looked up directly. Dotted names resolve the root
    /// first and then step through attributes left to right, stopping at the
    /// first missing one.
    pub fn resolve(&self, definition: &VariableDefinition) -> &Variable {
        if !definition.is_dotted() {
            return self.vars.get(definition.name()).unwrap_or(&UNDEFINED);
        }

        let Some(mut current) = self.vars.get(definition.root()) else {
            tracing::trace!(variable = %definition, "root variable is not bound");
            return &UNDEFINED;
        };

        for attr in definition.attributes() {
            match current.attr(attr) {
                Some(next) => current = next,
                None => {
                    tracing::trace!(
                        variable = %definition,
                        attribute = attr,
                        on = current.type_name(),
                        "attribute step failed"
                    );
                    return &UNDEFINED;
                }
            }
        }

        current
    }

    /// Bind the full name (dots included) to `value`, replacing any prior binding
    pub fn bind(&mut self, definition: &VariableDefinition, value: Variable) -> Option<Variable> {
        self.vars.insert(definition.name().to_string(), value)
    }

    /// Check whether the exact name has a binding
    pub fn contains(&self, definition: &VariableDefinition) -> bool {
        self.vars.contains_key(definition.name())
    }

    /// Iterate over all bindings (no particular order)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
