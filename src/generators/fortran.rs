//! Fortran code generator
//!
//! Generic generator for Fortran derived-type declarations from XSD
//! schemas, as used for Quantum Espresso style data files.

use std::path::Path;

use super::{Generator, GeneratorBuilder, GeneratorConfig};
use crate::error::Result;
use crate::schema::Schema;

/// Fortran generator variant
#[derive(Debug)]
pub struct FortranGenerator;

impl FortranGenerator {
    /// The Fortran generator configuration: language tag, bundled template
    /// directory and the builtin XSD-to-Fortran type table
    pub fn config() -> Result<GeneratorConfig> {
        GeneratorConfig::builder("Fortran")
            .template_path(Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/fortran"))
            .builtin_type("string", "CHARACTER(len=256)")
            .builtin_type("boolean", "LOGICAL")
            .builtin_type("double", "REAL(DP)")
            .builtin_type("integer", "INTEGER")
            .builtin_type("unsignedByte", "INTEGER")
            .builtin_type("nonNegativeInteger", "INTEGER")
            .builtin_type("positiveInteger", "INTEGER")
            .build()
    }

    /// Start building a Fortran generator
    pub fn builder() -> Result<GeneratorBuilder> {
        Ok(Generator::builder(Self::config()?))
    }

    /// Bind a Fortran generator to a schema with the default configuration
    pub fn new(schema: Schema) -> Result<Generator> {
        Self::builder()?.build(schema)
    }
}
