//! # xmlschema-codegen
//!
//! Template-driven source code generation from XML Schema (XSD)
//! definitions.
//!
//! A [`Generator`] binds a [`GeneratorConfig`] — the formal language tag,
//! default template search paths and a builtin type translation table — to
//! one [`Schema`] instance, exposes filter functions to the template
//! engine and renders text artifacts. Declarations are emitted in a
//! dependency-safe order: [`sorted_types`] orders complex types so that
//! every type appears after the types it references, with configurable
//! tolerance for circular dependencies.
//!
//! ## Example
//!
//! ```rust,ignore
//! use xmlschema_codegen::{FortranGenerator, Schema};
//!
//! let schema = Schema::from_file("schemas/qes.xsd")?;
//! let generator = FortranGenerator::new(schema)?;
//! generator.render_to_files(&["*.f90.jinja"], "src/generated", false)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod generators;
pub mod names;
pub mod schema;

// Re-exports for convenience
pub use error::{Error, Result};
pub use generators::sort::{sorted_complex_types, sorted_types};
pub use generators::{FortranGenerator, Generator, GeneratorConfig, TypedNode};
pub use schema::{AttributeDecl, Content, ElementDecl, Schema, SchemaType};

/// Version of the xmlschema-codegen library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_NAMESPACE: &str = names::XSD_NAMESPACE;
