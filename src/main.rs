//! Command-line interface for xmlschema-codegen

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xmlschema_codegen::{sorted_types, FortranGenerator, Generator, Schema};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xmlschema-codegen")]
#[command(author, version, about = "Source code generation from XSD schemas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render code templates for a schema
    Generate {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Template names or shell-style wildcard patterns
        #[arg(value_name = "TEMPLATES", default_values_t = [String::from("*")])]
        templates: Vec<String>,

        /// Target language
        #[arg(short, long, default_value = "fortran")]
        language: String,

        /// Additional search path for custom templates
        #[arg(short, long)]
        searchpath: Option<PathBuf>,

        /// Output directory for the rendered artifacts
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,
    },

    /// List a schema's types in dependency-sorted order
    Inspect {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Tolerate circular dependencies instead of failing
        #[arg(long)]
        accept_circularity: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            schema,
            templates,
            language,
            searchpath,
            output_dir,
            force,
        } => cmd_generate(schema, templates, language, searchpath, output_dir, force),
        Commands::Inspect {
            schema,
            accept_circularity,
        } => cmd_inspect(schema, accept_circularity),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_generate(
    schema_path: PathBuf,
    templates: Vec<String>,
    language: String,
    searchpath: Option<PathBuf>,
    output_dir: PathBuf,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::from_file(&schema_path)?;

    let mut builder = match language.to_lowercase().as_str() {
        "fortran" => FortranGenerator::builder()?,
        other => return Err(format!("unsupported language '{}'", other).into()),
    };
    if let Some(path) = searchpath {
        builder = builder.searchpath(path);
    }
    let generator: Generator = builder.build(schema)?;

    let names: Vec<&str> = templates.iter().map(String::as_str).collect();
    let written = generator.render_to_files(&names, &output_dir, force)?;
    for path in &written {
        println!("{}", path.display());
    }
    if written.is_empty() {
        eprintln!("No artifacts written (no matching templates, or targets exist; use --force)");
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(
    schema_path: PathBuf,
    accept_circularity: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::from_file(&schema_path)?;
    println!(
        "Schema: {} (target namespace: {})",
        schema.xsd_file().unwrap_or("<string>"),
        schema.target_namespace.as_deref().unwrap_or("<none>")
    );

    let ordered = sorted_types(schema.types.values(), accept_circularity)?;
    for schema_type in ordered {
        let kind = if schema_type.is_simple() {
            "simple"
        } else if schema_type.has_simple_content() {
            "complex (simple content)"
        } else {
            "complex"
        };
        println!("  {:<40} {}", schema_type.local_name, kind);
        for element in schema_type.content_elements() {
            println!(
                "    - {}: {}",
                element.local_name,
                element.type_name.as_deref().unwrap_or("anyType")
            );
        }
    }
    Ok(())
}
