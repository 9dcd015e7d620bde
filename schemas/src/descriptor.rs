use serde_json::{Map, Value};

/// Marker stored in a composed tree for a value no source has provided yet.
pub const MISSING: &str = "???";

/// The value shape a field accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Int,
    Float,
    Bool,
    Str,
    Path,
    Enum(&'static [&'static str]),
    /// A polymorphic slot, filled by one registered variant.
    Node,
}

impl FieldKind {
    /// A short human-readable name for the kind, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Int => "integer".into(),
            Self::Float => "float".into(),
            Self::Bool => "boolean".into(),
            Self::Str => "string".into(),
            Self::Path => "path".into(),
            Self::Enum(names) => format!("one of {}", names.join(", ")),
            Self::Node => "mapping".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    Value(Value),
    Missing,
}

/// The description of a single schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: FieldDefault,
    pub optional: bool,
    pub settable: bool,
}

impl FieldSpec {
    fn new(name: &'static str, kind: FieldKind, default: FieldDefault) -> Self {
        Self {
            name,
            kind,
            default,
            optional: false,
            settable: true,
        }
    }

    pub fn int(name: &'static str, default: i64) -> Self {
        Self::new(name, FieldKind::Int, FieldDefault::Value(default.into()))
    }

    pub fn float(name: &'static str, default: f64) -> Self {
        Self::new(name, FieldKind::Float, FieldDefault::Value(default.into()))
    }

    pub fn bool(name: &'static str, default: bool) -> Self {
        Self::new(name, FieldKind::Bool, FieldDefault::Value(default.into()))
    }

    pub fn string(name: &'static str, default: &str) -> Self {
        Self::new(name, FieldKind::Str, FieldDefault::Value(default.into()))
    }

    pub fn enumeration(name: &'static str, names: &'static [&'static str], default: &str) -> Self {
        Self::new(name, FieldKind::Enum(names), FieldDefault::Value(default.into()))
    }

    /// A path field no source has a default for.
    pub fn required_path(name: &'static str) -> Self {
        Self::new(name, FieldKind::Path, FieldDefault::Missing)
    }

    /// A path field that defaults to `null`.
    pub fn optional_path(name: &'static str) -> Self {
        Self::new(name, FieldKind::Path, FieldDefault::Value(Value::Null)).optional()
    }

    /// A slot for a registered variant, missing until one is selected.
    pub fn node(name: &'static str) -> Self {
        Self::new(name, FieldKind::Node, FieldDefault::Missing)
    }

    /// Marks the field as accepting `null`.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the field as computed by the program rather than by any config source.
    pub fn derived(mut self) -> Self {
        self.settable = false;
        self
    }

    /// The value this field holds before any source is merged.
    pub fn default_value(&self) -> Value {
        match &self.default {
            FieldDefault::Value(v) => v.clone(),
            FieldDefault::Missing => Value::String(MISSING.into()),
        }
    }
}

/// The runtime description of a schema: its type name and ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    type_name: &'static str,
    fields: Vec<FieldSpec>,
}

impl TypeDescriptor {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
        }
    }

    /// Appends a field, keeping declaration order.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Looks a field up by name.
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Builds the tree of default values for this schema.
    ///
    /// # Returns
    /// A mapping with one entry per field, in declaration order. Fields
    /// without a default hold the `MISSING` marker.
    pub fn defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|f| (f.name.to_string(), f.default_value()))
            .collect()
    }
}

/// Whether a value is the `MISSING` marker.
pub fn is_missing(value: &Value) -> bool {
    value.as_str() == Some(MISSING)
}
