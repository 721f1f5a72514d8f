//! Thin XSD reader
//!
//! Extracts the structural surface the generators need from an XSD
//! document: global named simple and complex types, their base types,
//! simple-content classification, flattened child element declarations,
//! attributes and occurrence bounds. This is a reader, not a validator;
//! unsupported constructs are skipped.

use indexmap::IndexMap;
use roxmltree::{Document, Node};
use tracing::debug;

use super::types::{AttributeDecl, Content, ElementDecl, SchemaType};
use super::Schema;
use crate::error::{Error, Result};
use crate::names::{extended_qname, XSD_NAMESPACE};

struct ReaderCtx<'a> {
    target_namespace: Option<&'a str>,
    tns_prefix: Option<&'a str>,
}

impl ReaderCtx<'_> {
    /// Qualify a declaration's local name with the target namespace
    fn qualify(&self, local: &str) -> String {
        extended_qname(self.target_namespace, local)
    }

    fn prefixed(&self, local: &str) -> String {
        match self.tns_prefix {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    /// Resolve a QName reference attribute against the in-scope namespace
    /// bindings of the node it appears on
    fn resolve_qname(&self, node: Node, value: &str) -> Result<String> {
        if let Some((prefix, local)) = value.split_once(':') {
            match node.lookup_namespace_uri(Some(prefix)) {
                Some(uri) => Ok(extended_qname(Some(uri), local)),
                None => Err(Error::Schema(format!(
                    "unknown namespace prefix '{}' in reference '{}'",
                    prefix, value
                ))),
            }
        } else if let Some(uri) = node.lookup_namespace_uri(None) {
            Ok(extended_qname(Some(uri), value))
        } else {
            // Lenient fallback for schemas that reference their own types
            // without a default namespace binding
            Ok(self.qualify(value))
        }
    }
}

fn xsd_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(XSD_NAMESPACE))
}

fn xsd_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    xsd_children(node).find(|n| n.tag_name().name() == name)
}

fn occurs(node: Node) -> Result<(u32, Option<u32>)> {
    let min_occurs = match node.attribute("minOccurs") {
        Some(value) => value
            .parse::<u32>()
            .map_err(|_| Error::Schema(format!("invalid minOccurs value '{}'", value)))?,
        None => 1,
    };
    let max_occurs = match node.attribute("maxOccurs") {
        Some("unbounded") => None,
        Some(value) => Some(
            value
                .parse::<u32>()
                .map_err(|_| Error::Schema(format!("invalid maxOccurs value '{}'", value)))?,
        ),
        None => Some(1),
    };
    Ok((min_occurs, max_occurs))
}

pub(super) fn parse_schema(text: &str) -> Result<Schema> {
    let doc = Document::parse(text)?;
    let root = doc.root_element();
    if root.tag_name().namespace() != Some(XSD_NAMESPACE) || root.tag_name().name() != "schema" {
        return Err(Error::Schema(format!(
            "root element <{}> is not an XSD schema",
            root.tag_name().name()
        )));
    }

    let target_namespace = root.attribute("targetNamespace").map(str::to_string);
    let tns_prefix = target_namespace.as_deref().and_then(|tns| {
        root.namespaces()
            .filter(|ns| ns.uri() == tns)
            .find_map(|ns| ns.name())
            .map(str::to_string)
    });
    let ctx = ReaderCtx {
        target_namespace: target_namespace.as_deref(),
        tns_prefix: tns_prefix.as_deref(),
    };

    let mut schema = Schema::new(target_namespace.as_deref());

    // Global element declarations first, so model-group references to them
    // can be resolved while reading the types
    for node in xsd_children(root).filter(|n| n.tag_name().name() == "element") {
        let local = node
            .attribute("name")
            .ok_or_else(|| Error::Schema("global element without a name".to_string()))?;
        let type_name = node
            .attribute("type")
            .map(|t| ctx.resolve_qname(node, t))
            .transpose()?;
        let (min_occurs, max_occurs) = occurs(node)?;
        schema.elements.insert(
            ctx.qualify(local),
            ElementDecl {
                name: ctx.qualify(local),
                local_name: local.to_string(),
                type_name,
                min_occurs,
                max_occurs,
            },
        );
    }

    for node in xsd_children(root) {
        match node.tag_name().name() {
            "simpleType" => {
                let schema_type = parse_simple_type(&ctx, node)?;
                schema.types.insert(schema_type.name.clone(), schema_type);
            }
            "complexType" => {
                let schema_type = parse_complex_type(&ctx, node, &schema.elements)?;
                schema.types.insert(schema_type.name.clone(), schema_type);
            }
            "element" | "annotation" | "import" | "include" | "attribute" | "attributeGroup"
            | "group" | "notation" => {}
            other => debug!("ignoring schema child <{}>", other),
        }
    }

    Ok(schema)
}

fn parse_simple_type(ctx: &ReaderCtx, node: Node) -> Result<SchemaType> {
    let local = node
        .attribute("name")
        .ok_or_else(|| Error::Schema("global simpleType without a name".to_string()))?;

    let base_type = xsd_child(node, "restriction")
        .and_then(|r| r.attribute("base").map(|b| ctx.resolve_qname(r, b)))
        .transpose()?;

    let mut schema_type = SchemaType::simple(ctx.qualify(local));
    schema_type.prefixed_name = Some(ctx.prefixed(local));
    schema_type.base_type = base_type;
    Ok(schema_type)
}

fn parse_complex_type(
    ctx: &ReaderCtx,
    node: Node,
    global_elements: &IndexMap<String, ElementDecl>,
) -> Result<SchemaType> {
    let local = node
        .attribute("name")
        .ok_or_else(|| Error::Schema("global complexType without a name".to_string()))?;

    let mut base_type = None;
    let mut attributes = collect_attributes(ctx, node)?;
    let content;

    if let Some(simple_content) = xsd_child(node, "simpleContent") {
        content = Content::SimpleContent;
        if let Some(derivation) =
            xsd_child(simple_content, "extension").or_else(|| xsd_child(simple_content, "restriction"))
        {
            base_type = derivation
                .attribute("base")
                .map(|b| ctx.resolve_qname(derivation, b))
                .transpose()?;
            attributes.extend(collect_attributes(ctx, derivation)?);
        }
    } else if let Some(complex_content) = xsd_child(node, "complexContent") {
        let mut elements = Vec::new();
        if let Some(derivation) =
            xsd_child(complex_content, "extension").or_else(|| xsd_child(complex_content, "restriction"))
        {
            base_type = derivation
                .attribute("base")
                .map(|b| ctx.resolve_qname(derivation, b))
                .transpose()?;
            elements = collect_elements(ctx, derivation, global_elements)?;
            attributes.extend(collect_attributes(ctx, derivation)?);
        }
        content = Content::Structured(elements);
    } else {
        content = Content::Structured(collect_elements(ctx, node, global_elements)?);
    }

    let mut schema_type = SchemaType::structured(ctx.qualify(local), Vec::new());
    schema_type.prefixed_name = Some(ctx.prefixed(local));
    schema_type.base_type = base_type;
    schema_type.content = content;
    schema_type.attributes = attributes;
    Ok(schema_type)
}

/// Flatten the element declarations of a model group tree
fn collect_elements(
    ctx: &ReaderCtx,
    node: Node,
    global_elements: &IndexMap<String, ElementDecl>,
) -> Result<Vec<ElementDecl>> {
    let mut elements = Vec::new();
    for child in xsd_children(node) {
        match child.tag_name().name() {
            "sequence" | "choice" | "all" => {
                elements.extend(collect_elements(ctx, child, global_elements)?);
            }
            "element" => {
                let (min_occurs, max_occurs) = occurs(child)?;
                if let Some(local) = child.attribute("name") {
                    let type_name = child
                        .attribute("type")
                        .map(|t| ctx.resolve_qname(child, t))
                        .transpose()?;
                    elements.push(ElementDecl {
                        name: ctx.qualify(local),
                        local_name: local.to_string(),
                        type_name,
                        min_occurs,
                        max_occurs,
                    });
                } else if let Some(reference) = child.attribute("ref") {
                    let qname = ctx.resolve_qname(child, reference)?;
                    match global_elements.get(&qname) {
                        Some(global) => elements.push(ElementDecl {
                            name: global.name.clone(),
                            local_name: global.local_name.clone(),
                            type_name: global.type_name.clone(),
                            min_occurs,
                            max_occurs,
                        }),
                        None => {
                            debug!("unresolved element reference '{}'", qname);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(elements)
}

fn collect_attributes(ctx: &ReaderCtx, node: Node) -> Result<Vec<AttributeDecl>> {
    let mut attributes = Vec::new();
    for child in xsd_children(node).filter(|n| n.tag_name().name() == "attribute") {
        let Some(local) = child.attribute("name") else {
            continue;
        };
        let type_name = child
            .attribute("type")
            .map(|t| ctx.resolve_qname(child, t))
            .transpose()?;
        attributes.push(AttributeDecl {
            name: local.to_string(),
            local_name: local.to_string(),
            type_name,
            required: child.attribute("use") == Some("required"),
        });
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::xsd_qname;

    const SAMPLE_XSD: &str = r#"
        <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                   xmlns:qes="urn:quantum-espresso"
                   targetNamespace="urn:quantum-espresso">
            <xs:simpleType name="vectorType">
                <xs:restriction base="xs:string"/>
            </xs:simpleType>
            <xs:complexType name="amountType">
                <xs:simpleContent>
                    <xs:extension base="xs:double">
                        <xs:attribute name="units" type="xs:string" use="required"/>
                    </xs:extension>
                </xs:simpleContent>
            </xs:complexType>
            <xs:complexType name="cellType">
                <xs:sequence>
                    <xs:element name="a1" type="qes:vectorType"/>
                    <xs:element name="a2" type="qes:vectorType"/>
                    <xs:choice>
                        <xs:element name="label" type="xs:string" minOccurs="0"/>
                        <xs:element ref="qes:note" maxOccurs="unbounded"/>
                    </xs:choice>
                </xs:sequence>
                <xs:attribute name="dims" type="xs:positiveInteger"/>
            </xs:complexType>
            <xs:element name="note" type="xs:string"/>
            <xs:element name="cell" type="qes:cellType"/>
        </xs:schema>
    "#;

    #[test]
    fn test_parse_global_types() {
        let schema = parse_schema(SAMPLE_XSD).unwrap();
        assert_eq!(schema.target_namespace.as_deref(), Some("urn:quantum-espresso"));
        assert_eq!(schema.types.len(), 3);
        assert_eq!(schema.elements.len(), 2);

        let vector = &schema.types["{urn:quantum-espresso}vectorType"];
        assert!(vector.is_simple());
        assert_eq!(vector.base_type.as_deref(), Some(xsd_qname("string").as_str()));
        assert_eq!(vector.prefixed_name.as_deref(), Some("qes:vectorType"));
    }

    #[test]
    fn test_parse_simple_content() {
        let schema = parse_schema(SAMPLE_XSD).unwrap();
        let amount = &schema.types["{urn:quantum-espresso}amountType"];
        assert!(amount.is_complex());
        assert!(amount.has_simple_content());
        assert_eq!(amount.base_type.as_deref(), Some(xsd_qname("double").as_str()));
        assert_eq!(amount.attributes.len(), 1);
        assert!(amount.attributes[0].required);
    }

    #[test]
    fn test_parse_structured_content() {
        let schema = parse_schema(SAMPLE_XSD).unwrap();
        let cell = &schema.types["{urn:quantum-espresso}cellType"];
        assert!(cell.is_complex());
        assert!(!cell.has_simple_content());

        // Nested choice is flattened; the element reference resolves to the
        // global declaration's type
        let elements = cell.content_elements();
        let names: Vec<&str> = elements.iter().map(|e| e.local_name.as_str()).collect();
        assert_eq!(names, ["a1", "a2", "label", "note"]);
        assert_eq!(
            elements[0].type_name.as_deref(),
            Some("{urn:quantum-espresso}vectorType")
        );
        assert_eq!(elements[2].min_occurs, 0);
        assert_eq!(elements[3].max_occurs, None);
        assert_eq!(elements[3].type_name.as_deref(), Some(xsd_qname("string").as_str()));

        assert_eq!(cell.attributes.len(), 1);
        assert!(!cell.attributes[0].required);
    }

    #[test]
    fn test_reject_non_schema_root() {
        let err = parse_schema("<root/>").unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_unknown_prefix_is_an_error() {
        let xsd = r#"
            <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:simpleType name="broken">
                    <xs:restriction base="missing:base"/>
                </xs:simpleType>
            </xs:schema>
        "#;
        let err = parse_schema(xsd).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
