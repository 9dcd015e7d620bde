use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use schemas::{FieldKind, TypeDescriptor};
use serde_json::{Map, Value};

use crate::{
    error::{ConfigError, Result},
    overrides::Override,
    store::ConfigStore,
    validate::{describe, join, validate},
};

/// Key of the primary config that lists the selected option of each group.
const DEFAULTS_KEY: &str = "defaults";
/// Key of an option file that names the schema variant it configures.
const SCHEMA_KEY: &str = "_schema_";

/// The variant chosen for one package of the root config.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub package: String,
    pub group: String,
    /// The option name given by the user or the primary config.
    pub option: String,
    /// The registered variant the option resolved to.
    pub variant: String,
    pub type_name: &'static str,
}

/// A fully merged and validated configuration tree.
#[derive(Debug, Clone)]
pub struct Composition {
    pub tree: Map<String, Value>,
    pub selections: Vec<Selection>,
}

impl Composition {
    pub fn selection(&self, package: &str) -> Option<&Selection> {
        self.selections.iter().find(|s| s.package == package)
    }
}

/// The schemas that apply to a tree: the root plus one per selected node.
pub(crate) struct SchemaView<'a> {
    root: &'a TypeDescriptor,
    nodes: Vec<(String, &'a TypeDescriptor)>,
}

impl<'a> SchemaView<'a> {
    pub(crate) fn root(&self) -> &'a TypeDescriptor {
        self.root
    }

    pub(crate) fn node(&self, path: &str) -> Option<&'a TypeDescriptor> {
        self.nodes
            .iter()
            .find(|(package, _)| package == path)
            .map(|&(_, schema)| schema)
    }
}

/// Merges config sources into a single tree checked against a `ConfigStore`.
///
/// Sources are applied in this order: schema defaults, selected variants and
/// their option files, the primary config file, command line assignments.
pub struct Composer<'a> {
    store: &'a ConfigStore,
    config_dir: Option<PathBuf>,
}

impl<'a> Composer<'a> {
    /// Creates a composer that only uses schema defaults and overrides.
    pub fn new(store: &'a ConfigStore) -> Self {
        Self {
            store,
            config_dir: None,
        }
    }

    /// Reads the primary config and option files from `dir`.
    pub fn with_config_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Composes the configuration.
    ///
    /// # Arguments
    /// * `overrides` - Command line overrides, applied last.
    ///
    /// # Returns
    /// The validated tree and the variant selected for every package.
    ///
    /// # Errors
    /// Any `ConfigError` raised while reading, merging or validating sources.
    pub fn compose(&self, overrides: &[Override]) -> Result<Composition> {
        let (root_name, root) = self.store.root();
        let mut tree = root.defaults();

        let dir = self.config_dir();
        let primary_path = dir.map(|dir| dir.join(format!("{root_name}.json")));
        let mut primary = match primary_path {
            Some(path) => load_optional(&path)?.unwrap_or_default(),
            None => Map::new(),
        };

        let mut choices = take_defaults(&mut primary)?;
        let mut assignments = Vec::new();
        for ov in overrides {
            if is_selection(root, ov) {
                let option = option_name(ov.value()).ok_or_else(|| ConfigError::TypeMismatch {
                    path: ov.key(),
                    expected: "an option name".into(),
                    found: describe(ov.value()),
                })?;
                choose(&mut choices, ov.key(), option);
            } else {
                assignments.push(ov);
            }
        }

        let mut view = SchemaView {
            root,
            nodes: Vec::new(),
        };
        let mut selections = Vec::new();
        for (package, option) in choices {
            match root.get(&package) {
                Some(field) if field.kind == FieldKind::Node => {}
                _ => return Err(ConfigError::UnknownField { path: package }),
            }

            let (selection, schema, node) = self.select(dir, &package, &option)?;
            tree.insert(package.clone(), Value::Object(node));
            view.nodes.push((package, schema));
            selections.push(selection);
        }

        merge(&mut tree, &primary, root, "", &view)?;
        for ov in assignments {
            assign(&mut tree, &view, ov)?;
        }

        validate(&mut tree, &view)?;
        Ok(Composition { tree, selections })
    }

    /// The config directory, if one is set and exists.
    fn config_dir(&self) -> Option<&Path> {
        let dir = self.config_dir.as_deref()?;
        if dir.is_dir() {
            Some(dir)
        } else {
            warn!("config directory {} does not exist, ignoring it", dir.display());
            None
        }
    }

    /// Resolves an option of a package to a registered variant.
    fn select(
        &self,
        dir: Option<&Path>,
        package: &str,
        option: &str,
    ) -> Result<(Selection, &'a TypeDescriptor, Map<String, Value>)> {
        let store = self.store;
        let group = store
            .group_for_package(package)
            .ok_or_else(|| ConfigError::UnknownVariant {
                group: package.into(),
                name: option.into(),
                valid: Vec::new(),
            })?;

        let option_path = dir.map(|dir| dir.join(package).join(format!("{option}.json")));
        let mut body = match option_path {
            Some(path) => load_optional(&path)?.unwrap_or_default(),
            None => Map::new(),
        };

        let variant = match body.remove(SCHEMA_KEY) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(ConfigError::TypeMismatch {
                    path: join(package, SCHEMA_KEY),
                    expected: "a schema name".into(),
                    found: describe(&other),
                });
            }
            None => option.to_string(),
        };

        let stored = store
            .get(group, &variant)
            .ok_or_else(|| ConfigError::UnknownVariant {
                group: group.into(),
                name: variant.clone(),
                valid: valid_options(store.names(group), dir, package),
            })?;

        let mut node = stored.schema.defaults();
        let node_view = SchemaView {
            root: &stored.schema,
            nodes: Vec::new(),
        };
        merge(&mut node, &body, &stored.schema, package, &node_view)?;

        info!(
            "selected {package}={option} ({})",
            stored.schema.type_name()
        );
        let selection = Selection {
            package: package.into(),
            group: group.into(),
            option: option.into(),
            variant,
            type_name: stored.schema.type_name(),
        };
        Ok((selection, &stored.schema, node))
    }
}

/// Registered variant names followed by the option files found for `package`.
fn valid_options(mut names: Vec<String>, dir: Option<&Path>, package: &str) -> Vec<String> {
    let Some(dir) = dir else {
        return names;
    };

    let mut files: Vec<String> = fs::read_dir(dir.join(package))
        .into_iter()
        .flatten()
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| Some(path.file_stem()?.to_str()?.to_string()))
        .filter(|stem| !names.contains(stem))
        .collect();
    files.sort();
    names.append(&mut files);
    names
}

/// Reads a JSON mapping from `path`, if the file exists.
fn load_optional(path: &Path) -> Result<Option<Map<String, Value>>> {
    if !path.is_file() {
        debug!("no config at {}", path.display());
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    debug!("loaded {}", path.display());

    match value {
        Value::Object(map) => Ok(Some(map)),
        other => Err(ConfigError::TypeMismatch {
            path: path.display().to_string(),
            expected: "a mapping".into(),
            found: describe(&other),
        }),
    }
}

/// Removes the `defaults` list from the primary config.
fn take_defaults(primary: &mut Map<String, Value>) -> Result<Vec<(String, String)>> {
    let Some(defaults) = primary.remove(DEFAULTS_KEY) else {
        return Ok(Vec::new());
    };

    let defaults = match defaults {
        Value::Object(map) => map,
        other => {
            return Err(ConfigError::TypeMismatch {
                path: DEFAULTS_KEY.into(),
                expected: "a mapping of package to option name".into(),
                found: describe(&other),
            });
        }
    };

    defaults
        .into_iter()
        .map(|(package, option)| match option_name(&option) {
            Some(name) => Ok((package, name)),
            None => Err(ConfigError::TypeMismatch {
                path: join(DEFAULTS_KEY, &package),
                expected: "an option name".into(),
                found: describe(&option),
            }),
        })
        .collect()
}

fn option_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn choose(choices: &mut Vec<(String, String)>, package: String, option: String) {
    match choices.iter_mut().find(|(p, _)| *p == package) {
        Some((_, current)) => *current = option,
        None => choices.push((package, option)),
    }
}

fn is_selection(root: &TypeDescriptor, ov: &Override) -> bool {
    matches!(ov.path(), [key] if root.get(key).is_some_and(|f| f.kind == FieldKind::Node))
}

/// Merges `source` over `target`, rejecting keys `schema` does not allow.
fn merge(
    target: &mut Map<String, Value>,
    source: &Map<String, Value>,
    schema: &TypeDescriptor,
    prefix: &str,
    view: &SchemaView<'_>,
) -> Result<()> {
    for (key, value) in source {
        let path = join(prefix, key);
        let field = schema
            .get(key)
            .ok_or_else(|| ConfigError::UnknownField { path: path.clone() })?;
        if !field.settable {
            return Err(ConfigError::NonSettableField { path });
        }

        if field.kind != FieldKind::Node {
            target.insert(key.clone(), value.clone());
            continue;
        }

        let Value::Object(source_node) = value else {
            return Err(ConfigError::TypeMismatch {
                path,
                expected: field.kind.describe(),
                found: describe(value),
            });
        };
        let node_schema = view
            .node(&path)
            .ok_or_else(|| ConfigError::MissingRequiredValue { path: path.clone() })?;
        let Some(Value::Object(target_node)) = target.get_mut(key) else {
            return Err(ConfigError::MissingRequiredValue { path });
        };
        merge(target_node, source_node, node_schema, &path, view)?;
    }

    Ok(())
}

/// Applies a single command line assignment.
fn assign(tree: &mut Map<String, Value>, view: &SchemaView<'_>, ov: &Override) -> Result<()> {
    let mut schema = view.root();
    let mut target = tree;
    let mut prefix = String::new();

    let (last, parents) = ov
        .path()
        .split_last()
        .ok_or_else(|| ConfigError::InvalidOverride(ov.key()))?;

    for key in parents {
        let path = join(&prefix, key);
        let field = schema
            .get(key)
            .ok_or_else(|| ConfigError::UnknownField { path: ov.key() })?;
        if field.kind != FieldKind::Node {
            return Err(ConfigError::UnknownField { path: ov.key() });
        }

        schema = view
            .node(&path)
            .ok_or_else(|| ConfigError::MissingRequiredValue { path: path.clone() })?;
        target = match target.get_mut(key.as_str()) {
            Some(Value::Object(node)) => node,
            _ => return Err(ConfigError::MissingRequiredValue { path }),
        };
        prefix = path;
    }

    let path = join(&prefix, last);
    let field = schema
        .get(last)
        .ok_or_else(|| ConfigError::UnknownField { path: path.clone() })?;
    if !field.settable {
        return Err(ConfigError::NonSettableField { path });
    }
    if field.kind == FieldKind::Node {
        return Err(ConfigError::TypeMismatch {
            path,
            expected: field.kind.describe(),
            found: describe(ov.value()),
        });
    }

    debug!("override {path}={}", ov.value());
    target.insert(last.clone(), ov.value().clone());
    Ok(())
}
