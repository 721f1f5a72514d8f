//! Schema component model
//!
//! The opaque records the code generators work against: named schema types
//! with their simple/complex classification, base-type link and child
//! element declarations, plus element and attribute declarations.
//!
//! Types serialize into template context values with the classification
//! flags (`is_simple`, `is_complex`, `has_simple_content`) materialized as
//! fields, so templates and filters can classify without the Rust type.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use crate::names;

/// Content variety of a schema type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// A simple type (atomic, list or union value)
    Simple,
    /// A complex type whose value model is a single scalar, possibly
    /// decorated with attributes
    SimpleContent,
    /// A complex type with child element declarations
    Structured(Vec<ElementDecl>),
}

impl Content {
    /// The child element declarations, empty unless the content is structured
    pub fn elements(&self) -> &[ElementDecl] {
        match self {
            Content::Structured(elements) => elements,
            _ => &[],
        }
    }
}

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Content", 1)?;
        state.serialize_field("elements", &self.elements())?;
        state.end()
    }
}

/// A named type definition within a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaType {
    /// Extended qualified name (`{namespace}local` or plain local name)
    pub name: String,
    /// Local part of the name
    pub local_name: String,
    /// Prefixed name as written in the source schema, when known
    pub prefixed_name: Option<String>,
    /// Namespace the type belongs to
    pub target_namespace: Option<String>,
    /// Extended qualified name of the immediate base type, if derived
    pub base_type: Option<String>,
    /// Content variety and child element declarations
    pub content: Content,
    /// Attribute declarations of a complex type
    pub attributes: Vec<AttributeDecl>,
}

impl SchemaType {
    fn named(name: impl Into<String>, content: Content) -> Self {
        let name = name.into();
        let local_name = names::local_part(&name).unwrap_or(&name).to_string();
        let target_namespace = names::namespace_part(&name)
            .filter(|ns| !ns.is_empty())
            .map(|ns| ns.to_string());
        Self {
            name,
            local_name,
            prefixed_name: None,
            target_namespace,
            base_type: None,
            content,
            attributes: Vec::new(),
        }
    }

    /// Create a simple type
    pub fn simple(name: impl Into<String>) -> Self {
        Self::named(name, Content::Simple)
    }

    /// Create a complex type with simple content
    pub fn with_simple_content(name: impl Into<String>) -> Self {
        Self::named(name, Content::SimpleContent)
    }

    /// Create a complex type with structured content
    pub fn structured(name: impl Into<String>, elements: Vec<ElementDecl>) -> Self {
        Self::named(name, Content::Structured(elements))
    }

    /// Set the base type
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(base.into());
        self
    }

    /// Set the attribute declarations
    pub fn with_attributes(mut self, attributes: Vec<AttributeDecl>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Whether this is a simple type
    pub fn is_simple(&self) -> bool {
        matches!(self.content, Content::Simple)
    }

    /// Whether this is a complex type
    pub fn is_complex(&self) -> bool {
        !self.is_simple()
    }

    /// Whether this is a complex type with simple content
    pub fn has_simple_content(&self) -> bool {
        matches!(self.content, Content::SimpleContent)
    }

    /// The immediate child element declarations (empty for simple types and
    /// for complex types with simple content)
    pub fn content_elements(&self) -> &[ElementDecl] {
        self.content.elements()
    }
}

impl Serialize for SchemaType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SchemaType", 10)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("local_name", &self.local_name)?;
        state.serialize_field("prefixed_name", &self.prefixed_name)?;
        state.serialize_field("target_namespace", &self.target_namespace)?;
        state.serialize_field("base_type", &self.base_type)?;
        state.serialize_field("is_simple", &self.is_simple())?;
        state.serialize_field("is_complex", &self.is_complex())?;
        state.serialize_field("has_simple_content", &self.has_simple_content())?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("attributes", &self.attributes)?;
        state.end()
    }
}

/// An element declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementDecl {
    /// Extended qualified name of the element
    pub name: String,
    /// Local part of the name
    pub local_name: String,
    /// Extended qualified name of the element's type; `None` means the
    /// element is untyped (XSD defaults it to `anyType`)
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    /// Minimum number of occurrences
    pub min_occurs: u32,
    /// Maximum number of occurrences, `None` for unbounded
    pub max_occurs: Option<u32>,
}

impl ElementDecl {
    /// Create an element declaration with default occurrence bounds
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        let local_name = names::local_part(&name).unwrap_or(&name).to_string();
        Self {
            name,
            local_name,
            type_name: Some(type_name.into()),
            min_occurs: 1,
            max_occurs: Some(1),
        }
    }

    /// Set the occurrence bounds (`None` max means unbounded)
    pub fn with_occurs(mut self, min_occurs: u32, max_occurs: Option<u32>) -> Self {
        self.min_occurs = min_occurs;
        self.max_occurs = max_occurs;
        self
    }
}

/// An attribute declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDecl {
    /// Name of the attribute
    pub name: String,
    /// Local part of the name
    pub local_name: String,
    /// Extended qualified name of the attribute's type
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    /// Whether `use="required"` was declared
    pub required: bool,
}

impl AttributeDecl {
    /// Create an attribute declaration
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let name = name.into();
        let local_name = names::local_part(&name).unwrap_or(&name).to_string();
        Self {
            name,
            local_name,
            type_name: Some(type_name.into()),
            required: false,
        }
    }
}
