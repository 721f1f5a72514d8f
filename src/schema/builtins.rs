//! XSD builtin type registry
//!
//! A scaled-down registry of the W3C XML Schema builtin types, enough for
//! type-name resolution: each builtin carries its classification and its
//! immediate base type so the mapper's fallback chain works uniformly for
//! schema-defined and builtin types.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use super::types::{Content, SchemaType};
use crate::names::{xsd_qname, XSD_NAMESPACE};

fn builtin(local: &str, base: Option<&str>, content: Content) -> (String, SchemaType) {
    let name = xsd_qname(local);
    let schema_type = SchemaType {
        name: name.clone(),
        local_name: local.to_string(),
        prefixed_name: Some(format!("xs:{}", local)),
        target_namespace: Some(XSD_NAMESPACE.to_string()),
        base_type: base.map(xsd_qname),
        content,
        attributes: Vec::new(),
    };
    (name, schema_type)
}

fn simple(local: &str, base: &str) -> (String, SchemaType) {
    builtin(local, Some(base), Content::Simple)
}

static BUILTIN_TYPES: Lazy<IndexMap<String, SchemaType>> = Lazy::new(|| {
    let mut types = IndexMap::new();
    for (name, schema_type) in [
        // Ur-types
        builtin("anyType", None, Content::Structured(Vec::new())),
        builtin("anySimpleType", Some("anyType"), Content::Simple),
        // Primitive types
        simple("string", "anySimpleType"),
        simple("boolean", "anySimpleType"),
        simple("decimal", "anySimpleType"),
        simple("float", "anySimpleType"),
        simple("double", "anySimpleType"),
        simple("duration", "anySimpleType"),
        simple("dateTime", "anySimpleType"),
        simple("time", "anySimpleType"),
        simple("date", "anySimpleType"),
        simple("gYearMonth", "anySimpleType"),
        simple("gYear", "anySimpleType"),
        simple("gMonthDay", "anySimpleType"),
        simple("gDay", "anySimpleType"),
        simple("gMonth", "anySimpleType"),
        simple("hexBinary", "anySimpleType"),
        simple("base64Binary", "anySimpleType"),
        simple("anyURI", "anySimpleType"),
        simple("QName", "anySimpleType"),
        simple("NOTATION", "anySimpleType"),
        // Derived string types
        simple("normalizedString", "string"),
        simple("token", "normalizedString"),
        simple("language", "token"),
        simple("Name", "token"),
        simple("NMTOKEN", "token"),
        simple("NCName", "Name"),
        simple("ID", "NCName"),
        simple("IDREF", "NCName"),
        simple("ENTITY", "NCName"),
        // Derived numeric types
        simple("integer", "decimal"),
        simple("nonPositiveInteger", "integer"),
        simple("negativeInteger", "nonPositiveInteger"),
        simple("long", "integer"),
        simple("int", "long"),
        simple("short", "int"),
        simple("byte", "short"),
        simple("nonNegativeInteger", "integer"),
        simple("unsignedLong", "nonNegativeInteger"),
        simple("unsignedInt", "unsignedLong"),
        simple("unsignedShort", "unsignedInt"),
        simple("unsignedByte", "unsignedShort"),
        simple("positiveInteger", "nonNegativeInteger"),
    ] {
        types.insert(name, schema_type);
    }
    types
});

/// Look up a builtin type by its extended qualified name
pub fn builtin_type(name: &str) -> Option<&'static SchemaType> {
    BUILTIN_TYPES.get(name)
}
