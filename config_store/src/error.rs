use std::{error::Error, fmt, io, path::PathBuf};

/// The config store's result type.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Every way registering, composing or decoding a configuration can fail.
#[derive(Debug)]
pub enum ConfigError {
    /// A schema was registered twice under the same group and name.
    DuplicateRegistration { group: String, name: String },
    /// The store was built without a root schema.
    MissingRoot,
    /// A required value was never provided by any source.
    MissingRequiredValue { path: String },
    /// A selected variant is not registered in its group.
    UnknownVariant {
        group: String,
        name: String,
        valid: Vec<String>,
    },
    /// A composed node's schema matches no variant the program knows.
    InternalDispatch { package: String, type_name: String },
    /// A source sets a key its schema does not declare.
    UnknownField { path: String },
    /// A source sets a field that is derived by the program.
    NonSettableField { path: String },
    /// A value has the wrong shape for its field.
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },
    /// A command line override is not of the form `key=value`.
    InvalidOverride(String),
    Io { path: PathBuf, source: io::Error },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A validated node could not be turned into its typed schema.
    Decode {
        path: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRegistration { group, name } if group.is_empty() => {
                write!(f, "root schema already registered, cannot register '{name}'")
            }
            Self::DuplicateRegistration { group, name } => {
                write!(f, "schema '{name}' already registered in group '{group}'")
            }
            Self::MissingRoot => write!(f, "no root schema registered"),
            Self::MissingRequiredValue { path } => {
                write!(f, "missing mandatory value: {path}")
            }
            Self::UnknownVariant { group, name, valid } => write!(
                f,
                "could not find '{name}' in group '{group}', available options: [{}]",
                valid.join(", ")
            ),
            Self::InternalDispatch { package, type_name } => write!(
                f,
                "no known variant for '{package}' of type '{type_name}'"
            ),
            Self::UnknownField { path } => write!(f, "key '{path}' not in schema"),
            Self::NonSettableField { path } => {
                write!(f, "field '{path}' is derived and cannot be set")
            }
            Self::TypeMismatch {
                path,
                expected,
                found,
            } => write!(f, "value for '{path}' must be {expected}, got {found}"),
            Self::InvalidOverride(raw) => {
                write!(f, "invalid override '{raw}', expected key=value")
            }
            Self::Io { path, source } => write!(f, "cannot read '{}': {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "invalid JSON in '{}': {source}", path.display())
            }
            Self::Decode { path, source } => write!(f, "cannot decode '{path}': {source}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } | Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_lists_valid_names() {
        let err = ConfigError::UnknownVariant {
            group: "model/schema".into(),
            name: "cnn".into(),
            valid: vec!["mlp".into(), "svm".into()],
        };

        assert_eq!(
            err.to_string(),
            "could not find 'cnn' in group 'model/schema', available options: [mlp, svm]"
        );
    }

    #[test]
    fn test_io_error_exposes_source() {
        let err = ConfigError::Io {
            path: "conf/primary.json".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(ConfigError::MissingRoot.source().is_none());
    }
}
