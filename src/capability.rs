//! Negotiated connection capabilities.

use std::collections::HashMap;

use crate::protocol::datatypes::TypedValue;

/// A named, typed connection-level option.
#[derive(Debug, Clone, PartialEq)]
pub struct Capability {
    pub name: String,
    pub value: TypedValue,
}

/// Capabilities decoded from the last successful negotiation.
///
/// Owned by one session; replaced wholesale each time `get_capabilities`
/// succeeds. Unsupported-shaped entries are skipped during population and
/// never appear here.
#[derive(Debug, Clone, Default)]
pub struct CapabilityTable {
    entries: HashMap<String, TypedValue>,
}

impl CapabilityTable {
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.entries.get(name)
    }

    /// The capability as a string scalar, if present with that shape.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.entries.get(name).and_then(TypedValue::as_str)
    }

    /// The capability as a bool scalar, if present with that shape.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.entries.get(name).and_then(TypedValue::as_bool)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Replace the whole table with a freshly decoded capability set.
    pub(crate) fn replace(&mut self, capabilities: Vec<Capability>) {
        self.entries = capabilities
            .into_iter()
            .map(|c| (c.name, c.value))
            .collect();
    }
}
