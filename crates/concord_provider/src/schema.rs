//! Resource schemas: attribute declarations, validators, plan modifiers.

use derive_getters::Getters;

/// Attribute value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum AttrType {
    /// UTF-8 string.
    String,
    /// 64-bit integer.
    Int,
    /// Boolean.
    Bool,
    /// 64-bit float.
    Float,
    /// List of strings.
    StringList,
    /// A JSON document stored as a normalized string.
    Json,
}

/// Config-time syntactic validator for one attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// 17-20 decimal digits.
    Snowflake,
    /// RFC3339 timestamp.
    Rfc3339,
    /// Value must be one of the listed strings.
    OneOf(Vec<&'static str>),
    /// Value must parse as JSON.
    WellFormedJson,
    /// Integer must lie in the inclusive range.
    IntRange(i64, i64),
}

/// Plan-time value rewrite for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanModifier {
    /// Canonicalize a JSON string so reordered keys do not diff.
    NormalizeJson,
    /// Trim a single trailing CRLF (message content).
    TrimTrailingCrlf,
    /// When the planned value is absent and prior state is known, keep the
    /// prior value. Used for write-only attributes the API never returns.
    PriorStateWins,
}

/// One schema attribute.
#[derive(Debug, Clone, Getters)]
pub struct Attribute {
    /// Attribute name in state.
    #[getter(skip)]
    name: &'static str,
    /// Value type.
    attr_type: AttrType,
    /// Must be present in config.
    required: bool,
    /// Filled in by the provider after apply.
    computed: bool,
    /// Never returned by the API; preserved verbatim across reads.
    write_only: bool,
    /// A change forces recreate instead of update.
    requires_replace: bool,
    /// Config-time validators.
    validators: Vec<Validator>,
    /// Plan-time modifiers.
    plan_modifiers: Vec<PlanModifier>,
}

impl Attribute {
    /// Attribute name in state.
    ///
    /// Returned by value; names are `'static` and outlive any schema.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn new(name: &'static str, attr_type: AttrType) -> Self {
        Self {
            name,
            attr_type,
            required: false,
            computed: false,
            write_only: false,
            requires_replace: false,
            validators: Vec::new(),
            plan_modifiers: Vec::new(),
        }
    }

    /// A string attribute.
    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttrType::String)
    }

    /// An integer attribute.
    pub fn int(name: &'static str) -> Self {
        Self::new(name, AttrType::Int)
    }

    /// A boolean attribute.
    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttrType::Bool)
    }

    /// A float attribute.
    pub fn float(name: &'static str) -> Self {
        Self::new(name, AttrType::Float)
    }

    /// A list-of-strings attribute.
    pub fn string_list(name: &'static str) -> Self {
        Self::new(name, AttrType::StringList)
    }

    /// A JSON attribute; normalized at plan and read time.
    pub fn json(name: &'static str) -> Self {
        Self::new(name, AttrType::Json)
            .validator(Validator::WellFormedJson)
            .plan_modifier(PlanModifier::NormalizeJson)
    }

    /// A snowflake id attribute.
    pub fn snowflake(name: &'static str) -> Self {
        Self::new(name, AttrType::String).validator(Validator::Snowflake)
    }

    /// Mark required.
    pub fn require(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark computed.
    pub fn compute(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Mark write-only: prior state wins at plan time and reads never
    /// overwrite the stored value.
    pub fn write_only_attr(mut self) -> Self {
        self.write_only = true;
        self.plan_modifiers.push(PlanModifier::PriorStateWins);
        self
    }

    /// Mark replace-on-change.
    pub fn force_new(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    /// Add a validator.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Add a plan modifier.
    pub fn plan_modifier(mut self, modifier: PlanModifier) -> Self {
        self.plan_modifiers.push(modifier);
        self
    }
}

/// A resource or data-source schema.
///
/// # Examples
///
/// ```
/// use concord_provider::{Attribute, Schema};
///
/// let schema = Schema::new()
///     .attribute(Attribute::snowflake("server_id").require().force_new())
///     .attribute(Attribute::string("name").require())
///     .attribute(Attribute::string("reason").write_only_attr());
/// assert!(schema.attribute_named("name").is_some());
/// ```
#[derive(Debug, Clone, Default, Getters)]
pub struct Schema {
    /// Declared attributes.
    attributes: Vec<Attribute>,
    /// Groups where exactly one member must be set.
    exactly_one_of: Vec<Vec<&'static str>>,
    /// `(attribute, trigger, trigger_value)`: attribute is required when
    /// trigger has the given value.
    required_when: Vec<(&'static str, &'static str, serde_json::Value)>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute.
    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Exactly one of the named attributes must be set.
    pub fn exactly_one(mut self, names: Vec<&'static str>) -> Self {
        self.exactly_one_of.push(names);
        self
    }

    /// `attribute` is required when `trigger` equals `value`.
    pub fn require_when(
        mut self,
        attribute: &'static str,
        trigger: &'static str,
        value: serde_json::Value,
    ) -> Self {
        self.required_when.push((attribute, trigger, value));
        self
    }

    /// Look up an attribute by name.
    pub fn attribute_named(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Names of write-only attributes.
    pub fn write_only_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(|a| *a.write_only())
            .map(Attribute::name)
    }
}
