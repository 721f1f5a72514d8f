//! Code generators
//!
//! A generator binds one [`GeneratorConfig`] (formal language, default
//! template paths, builtin type table) to one [`Schema`] instance and
//! drives the template engine: it composes the template search paths,
//! exposes the default and per-language filter functions to templates and
//! renders text artifacts, to strings or to files.

pub mod filters;
pub mod fortran;
pub mod sort;

pub use fortran::FortranGenerator;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use minijinja::value::{FunctionArgs, FunctionResult, Value};
use minijinja::{context, Environment, ErrorKind};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::names::{is_shell_wildcard, wildcard_match, xsd_qname};
use crate::schema::{AttributeDecl, ElementDecl, Schema, SchemaType};

/// Static configuration of a generator variant: the formal language tag,
/// the default template search paths and the builtin type translation
/// table.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    formal_language: String,
    default_paths: Vec<PathBuf>,
    builtin_types: IndexMap<String, String>,
}

impl GeneratorConfig {
    /// Start building a configuration for a formal language
    pub fn builder(formal_language: impl Into<String>) -> GeneratorConfigBuilder {
        GeneratorConfigBuilder {
            formal_language: formal_language.into(),
            default_paths: Vec::new(),
            builtin_types: IndexMap::new(),
        }
    }

    /// The formal language tag
    pub fn formal_language(&self) -> &str {
        &self.formal_language
    }

    /// The default template search paths, in declaration order
    pub fn default_paths(&self) -> &[PathBuf] {
        &self.default_paths
    }

    /// The builtin type translation table, keyed by extended qualified name
    pub fn builtin_types(&self) -> &IndexMap<String, String> {
        &self.builtin_types
    }

    /// Name of the default type-mapping filter exposed to templates
    pub fn type_filter_name(&self) -> String {
        format!("{}_type", self.formal_language)
            .to_lowercase()
            .replace(' ', "_")
    }
}

/// Builder for [`GeneratorConfig`]
#[derive(Debug)]
pub struct GeneratorConfigBuilder {
    formal_language: String,
    default_paths: Vec<PathBuf>,
    builtin_types: IndexMap<String, String>,
}

impl GeneratorConfigBuilder {
    /// Add a default template search path. Later declarations take
    /// precedence over earlier ones.
    pub fn template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.default_paths.push(path.into());
        self
    }

    /// Register a builtin type translation. Unqualified names are taken to
    /// be XSD builtins and qualified with the XSD namespace.
    pub fn builtin_type(mut self, name: &str, target: impl Into<String>) -> Self {
        let key = if name.starts_with('{') {
            name.to_string()
        } else {
            xsd_qname(name)
        };
        self.builtin_types.insert(key, target.into());
        self
    }

    /// Validate and build the configuration.
    ///
    /// A concrete generator must register at least one builtin type; the
    /// universal `anyType` and `anySimpleType` entries are supplied with an
    /// empty translation when not set explicitly. Default paths must be
    /// existing directories.
    pub fn build(self) -> Result<GeneratorConfig> {
        if self.builtin_types.is_empty() {
            return Err(Error::Config(format!(
                "empty builtin types table for the {} generator",
                self.formal_language
            )));
        }
        for path in &self.default_paths {
            if !path.is_dir() {
                return Err(Error::Config(format!(
                    "path '{}' is not a directory",
                    path.display()
                )));
            }
        }

        let mut builtin_types = self.builtin_types;
        for name in ["anyType", "anySimpleType"] {
            builtin_types.entry(xsd_qname(name)).or_default();
        }

        Ok(GeneratorConfig {
            formal_language: self.formal_language,
            default_paths: self.default_paths,
            builtin_types,
        })
    }
}

/// A schema component that carries a type, for type mapping
#[derive(Debug, Clone, Copy)]
pub enum TypedNode<'a> {
    /// A schema type itself
    Type(&'a SchemaType),
    /// An element declaration; its declared type is mapped
    Element(&'a ElementDecl),
    /// An attribute declaration; its declared type is mapped
    Attribute(&'a AttributeDecl),
}

impl<'a> From<&'a SchemaType> for TypedNode<'a> {
    fn from(t: &'a SchemaType) -> Self {
        TypedNode::Type(t)
    }
}

impl<'a> From<&'a ElementDecl> for TypedNode<'a> {
    fn from(e: &'a ElementDecl) -> Self {
        TypedNode::Element(e)
    }
}

impl<'a> From<&'a AttributeDecl> for TypedNode<'a> {
    fn from(a: &'a AttributeDecl) -> Self {
        TypedNode::Attribute(a)
    }
}

/// Resolve a type name through the translation table: direct hit, then the
/// immediate base type (one level only), then the universal `anyType` /
/// `anySimpleType` fallback. The universal entries are guaranteed by
/// config construction; their absence is a configuration error.
pub(crate) fn translate_type(
    types_map: &IndexMap<String, String>,
    name: &str,
    base_type: Option<&str>,
    is_complex: bool,
) -> Result<String> {
    if let Some(target) = types_map.get(name) {
        return Ok(target.clone());
    }
    if let Some(target) = base_type.and_then(|base| types_map.get(base)) {
        return Ok(target.clone());
    }
    let fallback = if is_complex {
        xsd_qname("anyType")
    } else {
        xsd_qname("anySimpleType")
    };
    types_map
        .get(&fallback)
        .cloned()
        .ok_or_else(|| Error::Config(format!("missing universal '{}' entry in types map", fallback)))
}

type FilterHook = Box<dyn FnOnce(&mut Environment<'static>) + Send>;

/// Builder for [`Generator`]
pub struct GeneratorBuilder {
    config: GeneratorConfig,
    searchpath: Option<PathBuf>,
    types_map: IndexMap<String, String>,
    filter_hooks: Vec<(String, FilterHook)>,
}

impl GeneratorBuilder {
    /// Additional search path for custom templates, taking precedence over
    /// the configured defaults
    pub fn searchpath(mut self, path: impl Into<PathBuf>) -> Self {
        self.searchpath = Some(path.into());
        self
    }

    /// Schema-specific type translation overrides. Keys are qualified with
    /// the schema's target namespace at build time.
    pub fn types_map<K, V, I>(mut self, entries: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.types_map
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Register a custom filter function, overriding a default of the same
    /// name
    pub fn filter<F, Rv, Args>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: minijinja::filters::Filter<Rv, Args>
            + for<'a> minijinja::filters::Filter<Rv, <Args as FunctionArgs<'a>>::Output>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        let name = name.into();
        let hook_name = name.clone();
        self.filter_hooks.push((
            name,
            Box::new(move |env: &mut Environment<'static>| env.add_filter::<String, F, Rv, Args>(hook_name, f)),
        ));
        self
    }

    /// Bind the configuration to a schema instance
    pub fn build(self, schema: Schema) -> Result<Generator> {
        let schema = Arc::new(schema);

        // Caller-supplied path first, then defaults in reverse declaration
        // order so the most specific default wins
        let mut search_paths = Vec::new();
        if let Some(path) = self.searchpath.clone() {
            search_paths.push(path);
        }
        search_paths.extend(self.config.default_paths.iter().rev().cloned());
        if search_paths.is_empty() {
            return Err(Error::Config(
                "at least one template search path is required for a generator instance".to_string(),
            ));
        }

        // Merged types map: caller overrides on top of the builtin table,
        // namespace-qualified when the schema has a target namespace
        let mut types_map = self.config.builtin_types.clone();
        match schema.target_namespace.as_deref() {
            Some(namespace) => {
                types_map.extend(
                    self.types_map
                        .into_iter()
                        .map(|(k, v)| (format!("{{{}}}{}", namespace, k), v)),
                );
            }
            None => types_map.extend(self.types_map),
        }
        let types_map = Arc::new(types_map);

        // Discover templates eagerly; the first search path providing a
        // relative name wins
        let mut sources: IndexMap<String, String> = IndexMap::new();
        for dir in &search_paths {
            if !dir.is_dir() {
                debug!("search path {:?} is not a directory, skipping", dir);
                continue;
            }
            discover_templates(dir, dir, &mut sources)?;
        }

        let mut env = Environment::new();
        let mut template_names = Vec::new();
        for (name, source) in sources {
            match env.add_template_owned(name.clone(), source) {
                Ok(()) => template_names.push(name),
                Err(err) => warn!("template {:?}: {}", name, err),
            }
        }

        env.add_filter("local_name", filters::local_name);
        env.add_filter("qname", filters::qname);
        env.add_filter("namespace", filters::namespace);
        env.add_filter("type_name", filters::type_name);
        env.add_filter(
            "sorted_types",
            filters::make_sorted_types_filter(Arc::clone(&schema), false),
        );
        env.add_filter(
            "sorted_complex_types",
            filters::make_sorted_types_filter(Arc::clone(&schema), true),
        );

        let custom_names: Vec<String> =
            self.filter_hooks.iter().map(|(name, _)| name.clone()).collect();
        for (_, hook) in self.filter_hooks {
            hook(&mut env);
        }

        let type_filter = self.config.type_filter_name();
        if !custom_names.contains(&type_filter) {
            env.add_filter(
                type_filter,
                filters::make_map_type_filter(Arc::clone(&schema), Arc::clone(&types_map)),
            );
        }

        Ok(Generator {
            config: self.config,
            schema,
            types_map,
            env,
            template_names,
        })
    }
}

/// Recursively collect template sources under `dir`, keyed by their
/// search-path-relative names
fn discover_templates(
    base: &Path,
    dir: &Path,
    sources: &mut IndexMap<String, String>,
) -> Result<()> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            discover_templates(base, &path, sources)?;
            continue;
        }
        let Ok(relative) = path.strip_prefix(base) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if sources.contains_key(&name) {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                sources.insert(name, source);
            }
            Err(err) => warn!("template {:?}: {}", name, err),
        }
    }
    Ok(())
}

/// A code generator bound to one schema instance.
///
/// Construction goes through [`Generator::builder`] with a
/// [`GeneratorConfig`] describing the generator variant.
pub struct Generator {
    config: GeneratorConfig,
    schema: Arc<Schema>,
    types_map: Arc<IndexMap<String, String>>,
    env: Environment<'static>,
    template_names: Vec<String>,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("formal_language", &self.config.formal_language)
            .field("xsd_file", &self.schema.xsd_file())
            .field("templates", &self.template_names)
            .finish()
    }
}

impl Generator {
    /// Start building a generator from a configuration
    pub fn builder(config: GeneratorConfig) -> GeneratorBuilder {
        GeneratorBuilder {
            config,
            searchpath: None,
            types_map: IndexMap::new(),
            filter_hooks: Vec::new(),
        }
    }

    /// The formal language this generator produces
    pub fn formal_language(&self) -> &str {
        self.config.formal_language()
    }

    /// The bound schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The merged type translation table
    pub fn types_map(&self) -> &IndexMap<String, String> {
        &self.types_map
    }

    /// Names of the templates visible through the search paths, in
    /// discovery order
    pub fn template_names(&self) -> &[String] {
        &self.template_names
    }

    /// Template names matching a shell-style wildcard pattern
    pub fn matching_templates(&self, pattern: &str) -> Vec<String> {
        self.template_names
            .iter()
            .filter(|name| wildcard_match(pattern, name))
            .cloned()
            .collect()
    }

    /// Map a schema component to a type declaration of the target language.
    ///
    /// Resolution order: the type's own qualified name, the immediate base
    /// type's name (one level only), then the universal `anyType` /
    /// `anySimpleType` entries.
    pub fn map_type<'a>(&self, node: impl Into<TypedNode<'a>>) -> Result<String> {
        match node.into() {
            TypedNode::Type(t) => {
                translate_type(&self.types_map, &t.name, t.base_type.as_deref(), t.is_complex())
            }
            TypedNode::Element(e) => self.map_type_name(e.type_name.as_deref()),
            TypedNode::Attribute(a) => self.map_type_name(a.type_name.as_deref()),
        }
    }

    fn map_type_name(&self, type_name: Option<&str>) -> Result<String> {
        // An untyped declaration defaults to anyType, per XSD
        let name = type_name
            .map(str::to_string)
            .unwrap_or_else(|| xsd_qname("anyType"));
        match self.schema.lookup_type(&name) {
            Some(t) => {
                translate_type(&self.types_map, &t.name, t.base_type.as_deref(), t.is_complex())
            }
            None => translate_type(&self.types_map, &name, None, false),
        }
    }

    /// Render the named templates with the schema in context.
    ///
    /// Templates that are not found are logged at debug level and skipped;
    /// rendering failures abort.
    pub fn render(&self, names: &[&str]) -> Result<Vec<String>> {
        let schema_value = Value::from_serialize(&*self.schema);
        let mut results = Vec::new();
        for name in names {
            let template = match self.env.get_template(name) {
                Ok(template) => template,
                Err(err) if matches!(err.kind(), ErrorKind::TemplateNotFound) => {
                    debug!("name {:?}: {}", name, err);
                    continue;
                }
                Err(err) => {
                    warn!("template {:?}: {}", name, err);
                    continue;
                }
            };
            results.push(template.render(context! { schema => schema_value.clone() })?);
        }
        Ok(results)
    }

    /// Render templates to files in an output directory.
    ///
    /// Wildcard patterns are expanded against the visible templates. Each
    /// rendered artifact is written under the template's base filename with
    /// its final extension stripped; existing files are skipped unless
    /// `force` is set. Returns the paths written.
    pub fn render_to_files(
        &self,
        names: &[&str],
        output_dir: impl AsRef<Path>,
        force: bool,
    ) -> Result<Vec<PathBuf>> {
        let output_dir = output_dir.as_ref();

        let mut template_names = Vec::new();
        for name in names {
            if is_shell_wildcard(name) {
                template_names.extend(self.matching_templates(name));
            } else {
                template_names.push((*name).to_string());
            }
        }

        let ordered = sort::sorted_complex_types(self.schema.types.values(), false)?;
        let sorted_value = Value::from_serialize(&ordered);
        let schema_value = Value::from_serialize(&*self.schema);

        std::fs::create_dir_all(output_dir)?;
        let mut rendered = Vec::new();
        for name in &template_names {
            let template = match self.env.get_template(name) {
                Ok(template) => template,
                Err(err) if matches!(err.kind(), ErrorKind::TemplateNotFound) => {
                    debug!("name {:?}: {}", name, err);
                    continue;
                }
                Err(err) => {
                    warn!("template {:?}: {}", name, err);
                    continue;
                }
            };

            let file_name = Path::new(name)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(name.as_str());
            let output_file = output_dir.join(PathBuf::from(file_name).with_extension(""));
            if !force && output_file.exists() {
                info!("skipping existing file {:?}", output_file);
                continue;
            }

            let result = template.render(context! {
                schema => schema_value.clone(),
                sorted_complex_types => sorted_value.clone(),
            })?;
            info!("write file {:?}", output_file);
            std::fs::write(&output_file, result)?;
            rendered.push(output_file);
        }
        Ok(rendered)
    }
}
