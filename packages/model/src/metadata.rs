//! Type/property metadata boundary.
//!
//! The catalog is a read-only lookup from a declaring type and a property
//! name to what editing code needs: default value, writability and an
//! accessor onto the realized object.

use crate::property::PropertyName;
use crate::realize::SceneObject;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Reads and writes one property on a realized object.
pub trait PropertyAccessor: Send + Sync {
    fn read(&self, object: &dyn SceneObject) -> Option<String>;

    /// `None` resets the property to its default
    fn write(&self, object: &mut dyn SceneObject, value: Option<&str>);
}

#[derive(Clone)]
pub struct PropertyMetadata {
    pub name: PropertyName,
    pub default_value: Option<String>,
    pub read_only: bool,
    pub accessor: Option<Arc<dyn PropertyAccessor>>,
}

impl PropertyMetadata {
    pub fn new(name: impl Into<PropertyName>) -> Self {
        Self {
            name: name.into(),
            default_value: None,
            read_only: false,
            accessor: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_accessor(mut self, accessor: Arc<dyn PropertyAccessor>) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Maps a value equal to the default onto `None` (property absent)
    pub fn normalize(&self, value: Option<String>) -> Option<String> {
        match (&value, &self.default_value) {
            (Some(v), Some(default)) if v == default => None,
            _ => value,
        }
    }
}

impl fmt::Debug for PropertyMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadata")
            .field("name", &self.name)
            .field("default_value", &self.default_value)
            .field("read_only", &self.read_only)
            .field("accessor", &self.accessor.is_some())
            .finish()
    }
}

pub trait MetadataCatalog: Send + Sync {
    /// Metadata for `name` on `type_name`. Attached names are looked up on
    /// their residence type instead.
    fn property(&self, type_name: &str, name: &PropertyName) -> Option<PropertyMetadata>;

    /// Property receiving children when nothing more specific is asked for
    fn default_property(&self, type_name: &str) -> Option<PropertyName>;
}

/// Table-driven catalog.
#[derive(Default, Clone)]
pub struct InMemoryCatalog {
    properties: HashMap<(String, PropertyName), PropertyMetadata>,
    default_properties: HashMap<String, PropertyName>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `metadata` on `type_name`; attached names register on their residence
    pub fn insert(&mut self, type_name: impl Into<String>, metadata: PropertyMetadata) {
        let owner = metadata
            .name
            .residence()
            .map(str::to_string)
            .unwrap_or_else(|| type_name.into());
        self.properties
            .insert((owner, metadata.name.clone()), metadata);
    }

    pub fn with_property(mut self, type_name: impl Into<String>, metadata: PropertyMetadata) -> Self {
        self.insert(type_name, metadata);
        self
    }

    pub fn with_default_property(
        mut self,
        type_name: impl Into<String>,
        name: impl Into<PropertyName>,
    ) -> Self {
        self.default_properties.insert(type_name.into(), name.into());
        self
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl MetadataCatalog for InMemoryCatalog {
    fn property(&self, type_name: &str, name: &PropertyName) -> Option<PropertyMetadata> {
        let owner = name.residence().unwrap_or(type_name);
        self.properties
            .get(&(owner.to_string(), name.clone()))
            .cloned()
    }

    fn default_property(&self, type_name: &str) -> Option<PropertyName> {
        self.default_properties.get(type_name).cloned()
    }
}

impl fmt::Debug for InMemoryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCatalog")
            .field("properties", &self.properties.len())
            .field("default_properties", &self.default_properties)
            .finish()
    }
}
