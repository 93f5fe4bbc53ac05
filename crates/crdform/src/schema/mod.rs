//! Attribute tree descriptors.
//!
//! A kind's configuration surface is declared once as a tree of
//! [`Attribute`]s. Each attribute binds a snake_case configuration name to the
//! camelCase field name Kubernetes uses on the wire, and carries its presence,
//! type and validators. Nothing here branches at runtime; the trees are
//! interpreted by [`crate::validate`] and [`crate::convert`].

mod validator;

use std::fmt;

use serde::Serialize;

pub use validator::FieldContext;
pub use validator::Validator;

/// Whether an attribute is supplied by the user, by the server, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Required,
    Optional,
    /// Read-only; configuring it is an error.
    Computed,
    /// May be configured; filled in by the adapter or server otherwise.
    OptionalComputed,
}

impl Presence {
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Required)
    }

    pub const fn accepts_config(self) -> bool {
        !matches!(self, Self::Computed)
    }
}

/// Value type of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "of", rename_all = "snake_case")]
pub enum AttrType {
    String,
    Int64,
    Float64,
    Bool,
    /// Free-form JSON carried verbatim (`x-kubernetes-preserve-unknown-fields`).
    Dynamic,
    List(Box<AttrType>),
    /// String-keyed map; keys are passed through untouched.
    Map(Box<AttrType>),
    Object(Vec<Attribute>),
}

impl AttrType {
    /// Attributes of the object this type holds, looking through lists and maps.
    pub fn object_attributes(&self) -> Option<&[Attribute]> {
        match self {
            Self::Object(attributes) => Some(attributes),
            Self::List(elem) | Self::Map(elem) => elem.object_attributes(),
            _ => None,
        }
    }

    fn into_computed(self) -> Self {
        match self {
            Self::Object(attributes) => {
                Self::Object(attributes.into_iter().map(Attribute::into_computed).collect())
            }
            Self::List(elem) => Self::List(Box::new(elem.into_computed())),
            Self::Map(elem) => Self::Map(Box::new(elem.into_computed())),
            other => other,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int64 => write!(f, "number (integer)"),
            Self::Float64 => write!(f, "number"),
            Self::Bool => write!(f, "bool"),
            Self::Dynamic => write!(f, "any value"),
            Self::List(elem) => write!(f, "list of {elem}"),
            Self::Map(elem) => write!(f, "map of {elem}"),
            Self::Object(_) => write!(f, "object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    pub wire_name: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,
    pub presence: Presence,
    #[serde(rename = "type")]
    pub ty: AttrType,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    /// Changing the value forces the object to be replaced.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub replace_on_change: bool,
    /// Adapter-side setting that is never sent to the API server.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub local: bool,
}

impl Attribute {
    pub fn new(name: &'static str, wire_name: &'static str, ty: AttrType) -> Self {
        Self {
            name,
            wire_name,
            description: "",
            presence: Presence::Optional,
            ty,
            validators: Vec::new(),
            replace_on_change: false,
            local: false,
        }
    }

    pub fn string(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, wire_name, AttrType::String)
    }

    pub fn int64(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, wire_name, AttrType::Int64)
    }

    pub fn float64(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, wire_name, AttrType::Float64)
    }

    pub fn bool(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, wire_name, AttrType::Bool)
    }

    pub fn dynamic(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, wire_name, AttrType::Dynamic)
    }

    pub fn string_list(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, wire_name, AttrType::List(Box::new(AttrType::String)))
    }

    pub fn string_map(name: &'static str, wire_name: &'static str) -> Self {
        Self::new(name, wire_name, AttrType::Map(Box::new(AttrType::String)))
    }

    pub fn object(name: &'static str, wire_name: &'static str, attributes: Vec<Attribute>) -> Self {
        Self::new(name, wire_name, AttrType::Object(attributes))
    }

    pub fn object_list(
        name: &'static str,
        wire_name: &'static str,
        attributes: Vec<Attribute>,
    ) -> Self {
        Self::new(
            name,
            wire_name,
            AttrType::List(Box::new(AttrType::Object(attributes))),
        )
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn computed(mut self) -> Self {
        self.presence = Presence::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.presence = Presence::OptionalComputed;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn replace_on_change(mut self) -> Self {
        self.replace_on_change = true;
        self
    }

    pub fn local(mut self) -> Self {
        self.local = true;
        self
    }

    /// Read-only copy of this attribute and everything below it, as used by
    /// data sources.
    pub fn into_computed(self) -> Self {
        Self {
            presence: Presence::Computed,
            ty: self.ty.into_computed(),
            validators: Vec::new(),
            ..self
        }
    }
}

/// Root of an adapter's attribute tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub description: String,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}
