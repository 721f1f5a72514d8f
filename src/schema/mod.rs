//! Schema model and thin XSD reader
//!
//! Code generation only needs the structural surface of a schema: its named
//! types, their simple/complex classification, base-type links and child
//! element declarations. This module owns that model and a reader that
//! extracts it from an XSD document. Schema validation semantics are out of
//! scope.

pub mod builtins;
mod parsing;
mod types;

pub use types::{AttributeDecl, Content, ElementDecl, SchemaType};

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;

/// An XSD schema reduced to its named components
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    /// The schema's target namespace
    pub target_namespace: Option<String>,
    /// Global named types, keyed by extended qualified name, in declaration
    /// order
    pub types: IndexMap<String, SchemaType>,
    /// Global element declarations, keyed by extended qualified name
    pub elements: IndexMap<String, ElementDecl>,
    /// Source location, when loaded from a file
    #[serde(skip)]
    pub url: Option<PathBuf>,
}

impl Schema {
    /// Create an empty schema with a target namespace
    pub fn new(target_namespace: Option<&str>) -> Self {
        Self {
            target_namespace: target_namespace.map(|ns| ns.to_string()),
            ..Default::default()
        }
    }

    /// Read a schema from an XSD file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut schema = Self::parse(&text)?;
        schema.url = Some(path.to_path_buf());
        Ok(schema)
    }

    /// Read a schema from XSD text
    pub fn parse(text: &str) -> Result<Self> {
        parsing::parse_schema(text)
    }

    /// Add a type to the schema, keyed by its qualified name
    pub fn add_type(&mut self, schema_type: SchemaType) -> &mut Self {
        self.types.insert(schema_type.name.clone(), schema_type);
        self
    }

    /// Look up a type by extended qualified name, falling back to the XSD
    /// builtin registry
    pub fn lookup_type(&self, name: &str) -> Option<&SchemaType> {
        self.types.get(name).or_else(|| builtins::builtin_type(name))
    }

    /// Base filename of the schema source, when loaded from a file
    pub fn xsd_file(&self) -> Option<&str> {
        self.url.as_deref().and_then(Path::file_name).and_then(|n| n.to_str())
    }
}
