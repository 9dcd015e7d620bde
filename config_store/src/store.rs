use log::debug;
use schemas::TypeDescriptor;

use crate::error::{ConfigError, Result};

/// A schema registered under a group, selectable by name.
#[derive(Debug, Clone)]
pub struct StoredSchema {
    pub group: String,
    pub name: String,
    /// The key of the root config where the selected schema is placed.
    pub package: String,
    pub schema: TypeDescriptor,
}

/// An immutable registry of schemas, built once at startup.
#[derive(Debug)]
pub struct ConfigStore {
    root_name: String,
    root: TypeDescriptor,
    entries: Vec<StoredSchema>,
}

impl ConfigStore {
    /// Starts building a new `ConfigStore`.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// The name and schema of the root config.
    pub fn root(&self) -> (&str, &TypeDescriptor) {
        (&self.root_name, &self.root)
    }

    pub fn get(&self, group: &str, name: &str) -> Option<&StoredSchema> {
        self.entries
            .iter()
            .find(|e| e.group == group && e.name == name)
    }

    /// The names of every schema in a group, in registration order.
    pub fn names(&self, group: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.group == group)
            .map(|e| e.name.clone())
            .collect()
    }

    /// Finds the group whose schemas are placed under `package`.
    pub fn group_for_package(&self, package: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.package == package)
            .map(|e| e.group.as_str())
    }
}

/// Collects registrations and freezes them into a `ConfigStore`.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    root: Option<(String, TypeDescriptor)>,
    entries: Vec<StoredSchema>,
}

impl StoreBuilder {
    /// Registers a schema under `group` as `name`.
    ///
    /// # Arguments
    /// * `group` - The group the schema can be selected from, e.g. `model/schema`.
    /// * `name` - The name that selects it.
    /// * `schema` - The schema's descriptor.
    /// * `package` - Where in the root config the schema is placed. Defaults to
    ///   the group path with `/` replaced by `.`.
    ///
    /// # Errors
    /// `DuplicateRegistration` if `group` already holds a schema named `name`.
    pub fn register(
        &mut self,
        group: &str,
        name: &str,
        schema: TypeDescriptor,
        package: Option<&str>,
    ) -> Result<&mut Self> {
        if self.entries.iter().any(|e| e.group == group && e.name == name) {
            return Err(ConfigError::DuplicateRegistration {
                group: group.into(),
                name: name.into(),
            });
        }

        let package = package.map_or_else(|| group.replace('/', "."), str::to_string);
        debug!(
            "registered {} as {group}/{name} at package '{package}'",
            schema.type_name()
        );

        self.entries.push(StoredSchema {
            group: group.into(),
            name: name.into(),
            package,
            schema,
        });
        Ok(self)
    }

    /// Registers the top level schema.
    ///
    /// # Errors
    /// `DuplicateRegistration` if a root is already registered.
    pub fn register_root(&mut self, name: &str, schema: TypeDescriptor) -> Result<&mut Self> {
        if self.root.is_some() {
            return Err(ConfigError::DuplicateRegistration {
                group: String::new(),
                name: name.into(),
            });
        }

        debug!("registered {} as root '{name}'", schema.type_name());
        self.root = Some((name.into(), schema));
        Ok(self)
    }

    /// Freezes the registrations.
    ///
    /// # Errors
    /// `MissingRoot` if no root schema was registered.
    pub fn build(self) -> Result<ConfigStore> {
        let (root_name, root) = self.root.ok_or(ConfigError::MissingRoot)?;
        Ok(ConfigStore {
            root_name,
            root,
            entries: self.entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use schemas::FieldSpec;

    use super::*;

    fn schema(name: &'static str) -> TypeDescriptor {
        TypeDescriptor::new(name).field(FieldSpec::int("size", 1))
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut builder = ConfigStore::builder();
        builder
            .register("model/schema", "mlp", schema("Mlp"), Some("model"))
            .unwrap();

        let res = builder.register("model/schema", "mlp", schema("Other"), Some("model"));
        assert!(matches!(
            res,
            Err(ConfigError::DuplicateRegistration { group, name })
                if group == "model/schema" && name == "mlp"
        ));
    }

    #[test]
    fn test_same_name_in_other_group_is_allowed() {
        let mut builder = ConfigStore::builder();
        builder
            .register("model/schema", "base", schema("A"), None)
            .unwrap()
            .register("dataset/schema", "base", schema("B"), None)
            .unwrap();
    }

    #[test]
    fn test_second_root_fails() {
        let mut builder = ConfigStore::builder();
        builder.register_root("primary", schema("Root")).unwrap();
        let res = builder.register_root("other", schema("Root"));
        assert!(matches!(res, Err(ConfigError::DuplicateRegistration { .. })));
    }

    #[test]
    fn test_build_requires_root() {
        let mut builder = ConfigStore::builder();
        builder.register("model/schema", "mlp", schema("Mlp"), None).unwrap();
        assert!(matches!(builder.build(), Err(ConfigError::MissingRoot)));
    }

    #[test]
    fn test_default_package_follows_group_path() {
        let mut builder = ConfigStore::builder();
        builder
            .register_root("primary", schema("Root"))
            .unwrap()
            .register("model/schema", "mlp", schema("Mlp"), None)
            .unwrap();
        let store = builder.build().unwrap();

        assert_eq!(store.get("model/schema", "mlp").unwrap().package, "model.schema");
        assert_eq!(store.group_for_package("model.schema"), Some("model/schema"));
        assert_eq!(store.group_for_package("model"), None);
    }

    #[test]
    fn test_names_keep_registration_order() {
        let mut builder = ConfigStore::builder();
        builder
            .register_root("primary", schema("Root"))
            .unwrap()
            .register("model/schema", "svm", schema("Svm"), Some("model"))
            .unwrap()
            .register("model/schema", "mlp", schema("Mlp"), Some("model"))
            .unwrap();
        let store = builder.build().unwrap();

        assert_eq!(store.names("model/schema"), ["svm", "mlp"]);
        assert_eq!(store.root().0, "primary");
        assert!(store.names("dataset/schema").is_empty());
    }
}
