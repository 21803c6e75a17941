//! Directory entries as seen by the schema validator.
//!
//! An [`Entry`] is a DN string plus an ordered list of attributes. Attribute
//! values are raw byte strings; nothing here normalizes them.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Name of the attribute that lists an entry's object classes.
pub const OBJECT_CLASS_ATTRIBUTE: &str = "objectClass";

/// An attribute description together with its raw values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    values: Vec<Vec<u8>>,
}

impl Attribute {
    pub fn new<V: Into<Vec<u8>>>(name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// The full attribute description, including any options.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The attribute description with options such as `;lang-en` removed.
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }

    pub fn values(&self) -> &[Vec<u8>] {
        &self.values
    }

    /// Values decoded as UTF-8, replacing invalid sequences.
    pub fn string_values(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.values.iter().map(|v| String::from_utf8_lossy(v))
    }

    pub fn has_value(&self, value: &[u8]) -> bool {
        self.values.iter().any(|v| v == value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn push_values(&mut self, values: impl IntoIterator<Item = Vec<u8>>) {
        for value in values {
            if !self.has_value(&value) {
                self.values.push(value);
            }
        }
    }
}

/// Strip attribute options from an attribute description.
pub fn base_name(description: &str) -> &str {
    match description.find(';') {
        Some(index) => &description[..index],
        None => description,
    }
}

/// A directory entry: a DN and its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    dn: String,
    attributes: Vec<Attribute>,
}

impl Entry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style variant of [`Entry::add_attribute`].
    pub fn with_attribute<V: Into<Vec<u8>>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.add_attribute(Attribute::new(name, values));
        self
    }

    /// Add an attribute. Values are merged into an existing attribute with the
    /// same description, and duplicate values are dropped.
    pub fn add_attribute(&mut self, attribute: Attribute) {
        match self
            .attributes
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(&attribute.name))
        {
            Some(existing) => existing.push_values(attribute.values),
            None => {
                let mut fresh = Attribute {
                    name: attribute.name,
                    values: Vec::with_capacity(attribute.values.len()),
                };
                fresh.push_values(attribute.values);
                self.attributes.push(fresh);
            }
        }
    }

    /// Remove the attribute with the given description. Returns whether one was removed.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| !a.name.eq_ignore_ascii_case(name));
        before != self.attributes.len()
    }

    pub fn dn(&self) -> &str {
        &self.dn
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Look up an attribute by its full description, ignoring case.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Every attribute whose base name matches, regardless of options.
    pub fn attributes_with_base_name<'a>(
        &'a self,
        base: &'a str,
    ) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.attributes
            .iter()
            .filter(move |a| a.base_name().eq_ignore_ascii_case(base))
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// The entry's objectClass values as strings.
    pub fn object_class_values(&self) -> Vec<String> {
        self.attribute(OBJECT_CLASS_ATTRIBUTE)
            .map(|a| a.string_values().map(Cow::into_owned).collect())
            .unwrap_or_default()
    }
}
