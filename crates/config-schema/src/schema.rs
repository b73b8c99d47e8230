//! The declarative schema model: typed field descriptors composed into
//! ordered, nestable [`Schema`]s.
//!
//! Schemas are pure descriptions. They are constructed once, at library
//! initialization, and never mutated afterwards; all per-request state lives
//! in the [resolver](crate::resolve).

use indexmap::IndexMap;
use serde_json::Value;

use crate::resolve::{Error, FieldPath};

/// A value-level constraint check attached to a [`Field`].
///
/// Validators run after type checking, so they may assume the value already
/// matches the field's declared [`FieldKind`]. They must be pure and
/// deterministic; the [`FieldPath`] is provided for error reporting only.
pub type Validator = fn(&Value, &FieldPath) -> Result<(), Error>;

/// The declared type of a single configuration field.
#[derive(Clone, Debug)]
pub enum FieldKind {
    /// A signed integer.
    Int,

    /// A boolean.
    Bool,

    /// A string.
    String,

    /// A mapping of string keys to string values.
    Map,

    /// A homogeneous list of scalar elements.
    List(Box<FieldKind>),

    /// A repeated nested block: a list of objects, each resolved against the
    /// given child schema.
    Block(Schema),
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int => f.write_str("integer"),
            Self::Bool => f.write_str("boolean"),
            Self::String => f.write_str("string"),
            Self::Map => f.write_str("map of strings"),
            Self::List(element) => write!(f, "list of {element}"),
            Self::Block(_) => f.write_str("list of blocks"),
        }
    }
}

/// Whether a field is supplied by the user, the remote system, or both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Presence {
    /// Must be present in user input.
    Required,

    /// May be present in user input.
    Optional,

    /// Never supplied by the user; the remote system fills in the value
    /// after the configuration has been applied. The resolver ignores user
    /// input for these fields.
    Computed,

    /// May be supplied by the user, or left for the remote system to fill.
    OptionalComputed,
}

impl Presence {
    /// Returns true if the field is exclusively system-populated.
    pub fn is_computed_only(self) -> bool {
        matches!(self, Self::Computed)
    }
}

/// Describes one named attribute of a configuration block: its type, its
/// presence rule, and any default, cardinality bound or constraint check.
///
/// Construction cannot fail. A declared default is *not* checked against the
/// field's validator; callers are responsible for supplying a default that
/// would itself pass validation.
#[derive(Clone, Debug)]
pub struct Field {
    pub kind: FieldKind,
    pub presence: Presence,
    pub default: Option<Value>,

    /// Upper bound on the element count of [`FieldKind::List`] and
    /// [`FieldKind::Block`] fields. `0` means unbounded.
    pub max_items: usize,

    pub validator: Option<Validator>,

    /// Free-text documentation. Not behaviorally significant.
    pub description: Option<String>,
}

impl Field {
    fn new(kind: FieldKind, presence: Presence) -> Self {
        Self {
            kind,
            presence,
            default: None,
            max_items: 0,
            validator: None,
            description: None,
        }
    }

    /// A field that must be present in user input.
    pub fn required(kind: FieldKind) -> Self {
        Self::new(kind, Presence::Required)
    }

    /// A field that may be present in user input.
    pub fn optional(kind: FieldKind) -> Self {
        Self::new(kind, Presence::Optional)
    }

    /// A field populated by the remote system after apply.
    pub fn computed(kind: FieldKind) -> Self {
        Self::new(kind, Presence::Computed)
    }

    /// A field the user may set, or leave for the remote system to fill.
    pub fn optional_computed(kind: FieldKind) -> Self {
        Self::new(kind, Presence::OptionalComputed)
    }

    /// Value used when the field is absent from user input.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Bounds the element count of a list or block field. `0` removes the
    /// bound.
    #[must_use]
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A set of sibling fields of which at most one may be set per resolved
/// element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExclusiveGroup {
    /// Name of the group, used in error messages.
    pub name: String,

    /// Field names belonging to the group. Members that are not declared in
    /// the schema simply never count as present.
    pub members: Vec<String>,
}

/// An ordered mapping of field names to [`Field`] descriptors, describing
/// one configuration block.
///
/// Field names are unique within a schema; insertion order is preserved for
/// documentation and output purposes but has no effect on validation
/// semantics. Blocks nest via [`FieldKind::Block`], so a schema describes a
/// finite tree.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    fields: IndexMap<String, Field>,
    exclusive_groups: Vec<ExclusiveGroup>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field to the schema.
    ///
    /// Redeclaring an existing name replaces the earlier descriptor (last
    /// writer wins), keeping the original position in the field order.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Merges all entries of `fragment` into this schema.
    ///
    /// On a name collision the fragment's descriptor wins (last-write-wins).
    /// This is deliberate but silent, so compose fragments whose field names
    /// are known not to overlap unless replacement is intended. Exclusive
    /// groups of both schemas are carried over.
    ///
    /// The fragment is consumed; composing a fragment into one schema can
    /// never alias state into another composition site.
    #[must_use]
    pub fn compose(mut self, fragment: Self) -> Self {
        self.fields.extend(fragment.fields);
        self.exclusive_groups.extend(fragment.exclusive_groups);
        self
    }

    /// Declares that at most one of `members` may be set per resolved
    /// element. The resolver enforces this after all fields of an element
    /// have been resolved.
    #[must_use]
    pub fn exclusive_group<I, S>(mut self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusive_groups.push(ExclusiveGroup {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Iterates over fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn exclusive_groups(&self) -> &[ExclusiveGroup] {
        &self.exclusive_groups
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
