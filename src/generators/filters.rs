//! Default template filter functions
//!
//! These operate on template context values (serialized schema components
//! or plain strings). Name-extraction filters follow the mapper convention
//! of returning the empty string for values they cannot interpret; the
//! sorting filters treat non-type inputs as contract violations and fail
//! the render.

use std::sync::Arc;

use indexmap::IndexMap;
use minijinja::value::Value;
use minijinja::ErrorKind;

use super::sort;
use super::translate_type;
use crate::names::{self, is_valid_ncname, is_valid_qname, xsd_qname};
use crate::schema::Schema;

/// A defined, non-null string attribute of a value
fn attr_str(value: &Value, name: &str) -> Option<String> {
    value
        .get_attr(name)
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_none())
        .and_then(|v| v.as_str().map(str::to_string))
}

/// Whether a value looks like a serialized schema type
fn is_type_value(value: &Value) -> bool {
    value
        .get_attr("is_simple")
        .map(|v| !v.is_undefined())
        .unwrap_or(false)
}

fn invalid_operation(message: impl Into<String>) -> minijinja::Error {
    minijinja::Error::new(ErrorKind::InvalidOperation, message.into())
}

/// Extract the local name of a schema component, qualified name string or
/// extended qualified name string
pub fn local_name(value: Value) -> String {
    if let Some(local) = attr_str(&value, "local_name") {
        return if is_valid_ncname(&local) {
            local
        } else {
            String::new()
        };
    }

    let Some(name) = attr_str(&value, "name").or_else(|| value.as_str().map(str::to_string))
    else {
        return String::new();
    };
    match names::local_part(&name) {
        Some(local) if is_valid_ncname(local) => local.to_string(),
        _ => String::new(),
    }
}

/// Extract the qualified name of a schema component, preferring the
/// prefixed form when it is known
pub fn qname(value: Value) -> String {
    if let Some(prefixed) = attr_str(&value, "prefixed_name") {
        return if is_valid_qname(&prefixed) {
            prefixed
        } else {
            String::new()
        };
    }

    let Some(name) = attr_str(&value, "name").or_else(|| value.as_str().map(str::to_string))
    else {
        return String::new();
    };
    if name.starts_with('{') {
        // An extended qualified name is returned whole, if well formed
        return match names::local_part(&name) {
            Some(_) => name,
            None => String::new(),
        };
    }
    if is_valid_qname(&name) {
        name
    } else {
        String::new()
    }
}

/// Extract the namespace of a schema component or extended qualified name
pub fn namespace(value: Value) -> String {
    if let Ok(target) = value.get_attr("target_namespace") {
        if !target.is_undefined() {
            return target.as_str().unwrap_or("").to_string();
        }
    }

    let Some(name) = attr_str(&value, "name").or_else(|| value.as_str().map(str::to_string))
    else {
        return String::new();
    };
    names::namespace_part(&name).unwrap_or("").to_string()
}

/// Local name of a schema type, or of an element's or attribute's type
pub fn type_name(value: Value) -> String {
    if is_type_value(&value) {
        return attr_str(&value, "local_name").unwrap_or_default();
    }
    if let Ok(type_ref) = value.get_attr("type") {
        if !type_ref.is_undefined() {
            return type_ref
                .as_str()
                .and_then(names::local_part)
                .unwrap_or("")
                .to_string();
        }
    }
    String::new()
}

/// Build the per-language type-mapping filter bound to a schema and a
/// merged types map
pub(super) fn make_map_type_filter(
    schema: Arc<Schema>,
    types_map: Arc<IndexMap<String, String>>,
) -> impl Fn(Value) -> Result<String, minijinja::Error> + Send + Sync + 'static {
    move |value: Value| {
        if is_type_value(&value) {
            let name = attr_str(&value, "name")
                .ok_or_else(|| invalid_operation("schema type value without a name"))?;
            let base_type = attr_str(&value, "base_type");
            let is_complex = value
                .get_attr("is_complex")
                .map(|v| v.is_true())
                .unwrap_or(false);
            return translate_type(&types_map, &name, base_type.as_deref(), is_complex)
                .map_err(|err| invalid_operation(err.to_string()));
        }

        // Element and attribute declarations carry a "type" field; a null
        // type means XSD's default anyType
        if let Ok(type_ref) = value.get_attr("type") {
            if !type_ref.is_undefined() {
                let qname = type_ref
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| xsd_qname("anyType"));
                let (name, base_type, is_complex) = match schema.lookup_type(&qname) {
                    Some(t) => (t.name.clone(), t.base_type.clone(), t.is_complex()),
                    None => (qname, None, false),
                };
                return translate_type(&types_map, &name, base_type.as_deref(), is_complex)
                    .map_err(|err| invalid_operation(err.to_string()));
            }
        }

        Ok(String::new())
    }
}

/// Build the `sorted_types` / `sorted_complex_types` filter bound to a
/// schema. Accepts a mapping (sorts its member names) or a sequence of
/// serialized schema types; an optional second argument tolerates
/// circular dependencies.
pub(super) fn make_sorted_types_filter(
    schema: Arc<Schema>,
    complex_only: bool,
) -> impl Fn(Value, Option<bool>) -> Result<Value, minijinja::Error> + Send + Sync + 'static {
    move |value: Value, accept_circularity: Option<bool>| {
        let accept_circularity = accept_circularity.unwrap_or(false);

        let mut members = Vec::new();
        for item in value
            .try_iter()
            .map_err(|_| invalid_operation("sort input must be a sequence or mapping of schema types"))?
        {
            let name = if let Some(name) = item.as_str() {
                name.to_string()
            } else if let Some(name) = attr_str(&item, "name") {
                name
            } else {
                return Err(invalid_operation(format!(
                    "sort input contains a non schema type value: {}",
                    item
                )));
            };
            let schema_type = schema
                .lookup_type(&name)
                .ok_or_else(|| invalid_operation(format!("unknown schema type '{}'", name)))?;
            members.push(schema_type);
        }

        let ordered = if complex_only {
            sort::sorted_complex_types(members, accept_circularity)
        } else {
            sort::sorted_types(members, accept_circularity)
        }
        .map_err(|err| invalid_operation(err.to_string()))?;

        Ok(Value::from_serialize(&ordered))
    }
}
