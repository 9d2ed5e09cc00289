//! Compiling JSON Schema documents into a form that can generate data.
//!
//! Compilation applies the [`Config`] to every bound the document leaves
//! open, so the resulting [`Schema`] only holds concrete, non-empty ranges.
//! That is what lets [`Schema::fake`] generate without ever failing.

use crate::config::Config;
use crate::error::{Reason, UnsupportedSchemaError};
use crate::hint::{self, Format};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;

// Keywords whose constraints we do not know how to satisfy. Rather than
// produce data that silently violates them, compilation rejects them.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "pattern",
    "allOf",
    "anyOf",
    "oneOf",
    "not",
    "if",
    "minProperties",
    "maxProperties",
    "dependencies",
    "dependentRequired",
    "dependentSchemas",
    "contains",
];

/// The longest string, and the largest array, compilation will agree to
/// generate. Larger `maxLength` / `maxItems` values are clamped to it; a
/// `minLength` / `minItems` above it is rejected.
pub const MAX_GENERATED_LENGTH: usize = 4096;

// 2^63, the first f64 past `i64::MAX`.
const I64_END: f64 = 9_223_372_036_854_775_808.0;

const DEFINITIONS_PREFIX: &str = "#/definitions/";
const DEFS_PREFIX: &str = "#/$defs/";

/// A compiled schema document, ready to generate data from.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) root: Node,
    pub(crate) definitions: BTreeMap<String, Node>,
    pub(crate) optional_probability: f64,
}

/// One compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A reference to a root-level definition.
    Ref(String),
    Const(Value),
    /// Non-empty; every member satisfies the node's declared type and
    /// constraints.
    Enum(Vec<Value>),
    /// Non-empty; one member is picked per generated value.
    Types(Vec<Typed>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Typed {
    Null,
    Boolean,
    Integer(IntegerRange),
    Number(NumberRange),
    String(StringShape),
    Array(ArrayShape),
    Object(ObjectShape),
}

/// Integers `step * k` for every `k` in `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegerRange {
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
    pub exclusive_min: bool,
    pub exclusive_max: bool,
}

impl NumberRange {
    pub fn contains(&self, n: f64) -> bool {
        let above = if self.exclusive_min { n > self.min } else { n >= self.min };
        let below = if self.exclusive_max { n < self.max } else { n <= self.max };
        above && below
    }

    /// Some value inside the range, preferring its midpoint. `None` when no
    /// float lies within it.
    pub fn fallback(&self) -> Option<f64> {
        let mid = self.min + (self.max - self.min) / 2.0;
        [mid, self.max, self.min].iter().copied().find(|n| self.contains(*n))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StringShape {
    /// Printable ASCII with a length in `min..=max`.
    Random { min: usize, max: usize },
    Format(Format),
    Faker(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayShape {
    pub items: Box<Node>,
    pub min_items: usize,
    pub max_items: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectShape {
    /// In declaration order.
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub required: bool,
    pub schema: Node,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Type {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl Type {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "null" => Type::Null,
            "boolean" => Type::Boolean,
            "integer" => Type::Integer,
            "number" => Type::Number,
            "string" => Type::String,
            "array" => Type::Array,
            "object" => Type::Object,
            _ => return None,
        })
    }

    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Type::Null, Value::Null) => true,
            (Type::Boolean, Value::Bool(_)) => true,
            (Type::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().map_or(false, |f| f.fract() == 0.0)
            }
            (Type::Number, Value::Number(_)) => true,
            (Type::String, Value::String(_)) => true,
            (Type::Array, Value::Array(_)) => true,
            (Type::Object, Value::Object(_)) => true,
            _ => false,
        }
    }
}

impl Schema {
    /// Compiles `schema` with the default [`Config`].
    pub fn compile(schema: &Value) -> Result<Self, UnsupportedSchemaError> {
        Self::compile_with_config(schema, &Config::default())
    }

    // `config` must have passed `Config::validate`; `Generator::new` is the
    // public way in.
    pub(crate) fn compile_with_config(
        schema: &Value,
        config: &Config,
    ) -> Result<Self, UnsupportedSchemaError> {
        let root_obj = schema
            .as_object()
            .ok_or_else(|| UnsupportedSchemaError::new("", Reason::NotAnObject))?;

        let mut raw_definitions = Vec::new();
        for keyword in &["definitions", "$defs"] {
            match root_obj.get(*keyword) {
                None => {}
                Some(Value::Object(defs)) => {
                    for (name, def) in defs {
                        raw_definitions.push((*keyword, name, def));
                    }
                }
                Some(_) => {
                    return Err(UnsupportedSchemaError::new(
                        "",
                        Reason::Malformed {
                            keyword: *keyword,
                            expected: "an object",
                        },
                    ))
                }
            }
        }

        let compiler = Compiler {
            config,
            definition_names: raw_definitions
                .iter()
                .map(|&(_, name, _)| name.as_str())
                .collect(),
        };

        let mut definitions = BTreeMap::new();
        for (keyword, name, def) in raw_definitions {
            let pointer = format!("/{}/{}", escape(keyword), escape(name));
            tracing::trace!(%pointer, "compiling definition");
            definitions.insert(name.clone(), compiler.compile(def, &pointer)?);
        }

        let root = compiler.compile(schema, "")?;
        check_acyclic(&definitions)?;

        Ok(Self {
            root,
            definitions,
            optional_probability: config.optional_probability,
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn definitions(&self) -> &BTreeMap<String, Node> {
        &self.definitions
    }
}

struct Compiler<'a> {
    config: &'a Config,
    definition_names: BTreeSet<&'a str>,
}

impl Compiler<'_> {
    fn compile(&self, schema: &Value, pointer: &str) -> Result<Node, UnsupportedSchemaError> {
        let err = |reason| UnsupportedSchemaError::new(pointer, reason);
        let obj = schema.as_object().ok_or_else(|| err(Reason::NotAnObject))?;

        for keyword in UNSUPPORTED_KEYWORDS {
            if obj.contains_key(*keyword) {
                return Err(err(Reason::UnsupportedKeyword((*keyword).to_owned())));
            }
        }

        if obj.get("uniqueItems") == Some(&Value::Bool(true)) {
            return Err(err(Reason::UnsupportedKeyword("uniqueItems".to_owned())));
        }

        if let Some(reference) = obj.get("$ref") {
            let reference = reference.as_str().ok_or_else(|| {
                err(Reason::Malformed {
                    keyword: "$ref",
                    expected: "a string",
                })
            })?;

            return self.compile_ref(reference).map_err(err);
        }

        let types = match obj.get("type") {
            None => return Err(err(Reason::MissingType)),
            Some(Value::String(name)) => vec![parse_type(name).map_err(err)?],
            Some(Value::Array(names)) if !names.is_empty() => {
                let mut types = Vec::new();
                for name in names {
                    let name = name.as_str().ok_or_else(|| err(type_malformed()))?;
                    let type_ = parse_type(name).map_err(err)?;
                    if !types.contains(&type_) {
                        types.push(type_);
                    }
                }

                types
            }
            Some(_) => return Err(err(type_malformed())),
        };

        if let Some(value) = obj.get("const") {
            if !satisfies(obj, &types, value).map_err(err)? {
                return Err(err(Reason::ConstMismatch));
            }

            return Ok(Node::Const(value.clone()));
        }

        if let Some(values) = obj.get("enum") {
            let values = values.as_array().ok_or_else(|| {
                err(Reason::Malformed {
                    keyword: "enum",
                    expected: "an array",
                })
            })?;

            let mut members = Vec::new();
            for value in values {
                if satisfies(obj, &types, value).map_err(err)? {
                    members.push(value.clone());
                } else {
                    tracing::trace!(%pointer, %value, "dropping enum member");
                }
            }

            if members.is_empty() {
                return Err(err(Reason::EmptyEnum));
            }

            return Ok(Node::Enum(members));
        }

        let mut typed = Vec::with_capacity(types.len());
        for type_ in types {
            typed.push(self.compile_typed(type_, obj, pointer)?);
        }

        Ok(Node::Types(typed))
    }

    fn compile_ref(&self, reference: &str) -> Result<Node, Reason> {
        let name = reference
            .strip_prefix(DEFINITIONS_PREFIX)
            .or_else(|| reference.strip_prefix(DEFS_PREFIX));

        match name {
            Some(name) => {
                let name = unescape(name);
                if self.definition_names.contains(name.as_str()) {
                    Ok(Node::Ref(name))
                } else {
                    Err(Reason::UnknownRef(reference.to_owned()))
                }
            }

            None if reference.starts_with('#') => Err(Reason::UnknownRef(reference.to_owned())),
            None => Err(Reason::RemoteRef(reference.to_owned())),
        }
    }

    fn compile_typed(
        &self,
        type_: Type,
        obj: &Map<String, Value>,
        pointer: &str,
    ) -> Result<Typed, UnsupportedSchemaError> {
        let err = |reason| UnsupportedSchemaError::new(pointer, reason);

        Ok(match type_ {
            Type::Null => Typed::Null,
            Type::Boolean => Typed::Boolean,
            Type::Integer => Typed::Integer(self.integer_range(obj).map_err(err)?),
            Type::Number => Typed::Number(self.number_range(obj).map_err(err)?),
            Type::String => Typed::String(self.string_shape(obj, pointer).map_err(err)?),
            Type::Array => {
                let (min_items, max_items) = self
                    .length_range(
                        obj,
                        "minItems",
                        "maxItems",
                        self.config.min_items,
                        self.config.max_items,
                    )
                    .map_err(err)?;

                let items = match obj.get("items") {
                    None => return Err(err(Reason::MissingItems)),
                    Some(Value::Array(_)) => {
                        return Err(err(Reason::UnsupportedKeyword("items".to_owned())))
                    }
                    Some(items) => self.compile(items, &format!("{}/items", pointer))?,
                };

                Typed::Array(ArrayShape {
                    items: Box::new(items),
                    min_items,
                    max_items,
                })
            }
            Type::Object => Typed::Object(self.object_shape(obj, pointer)?),
        })
    }

    fn object_shape(
        &self,
        obj: &Map<String, Value>,
        pointer: &str,
    ) -> Result<ObjectShape, UnsupportedSchemaError> {
        let err = |reason| UnsupportedSchemaError::new(pointer, reason);

        let declared = match obj.get("properties") {
            None => None,
            Some(Value::Object(properties)) => Some(properties),
            Some(_) => {
                return Err(err(Reason::Malformed {
                    keyword: "properties",
                    expected: "an object",
                }))
            }
        };

        let mut required = BTreeSet::new();
        if let Some(names) = obj.get("required") {
            let malformed = || {
                err(Reason::Malformed {
                    keyword: "required",
                    expected: "an array of strings",
                })
            };

            for name in names.as_array().ok_or_else(malformed)? {
                let name = name.as_str().ok_or_else(malformed)?;
                if !declared.map_or(false, |d| d.contains_key(name)) {
                    return Err(err(Reason::UndeclaredRequired(name.to_owned())));
                }

                required.insert(name);
            }
        }

        let mut properties = Vec::new();
        for (name, schema) in declared.into_iter().flatten() {
            let pointer = format!("{}/properties/{}", pointer, escape(name));
            properties.push(Property {
                name: name.clone(),
                required: required.contains(name.as_str()),
                schema: self.compile(schema, &pointer)?,
            });
        }

        Ok(ObjectShape { properties })
    }

    fn string_shape(&self, obj: &Map<String, Value>, pointer: &str) -> Result<StringShape, Reason> {
        let has_length = obj.contains_key("minLength") || obj.contains_key("maxLength");

        if let Some(format) = obj.get("format") {
            let name = format.as_str().ok_or(Reason::Malformed {
                keyword: "format",
                expected: "a string",
            })?;

            match Format::from_name(name) {
                Some(_) if has_length => return Err(Reason::LengthWithFormat("format")),
                Some(format) => return Ok(StringShape::Format(format)),
                None => tracing::debug!(%pointer, format = name, "ignoring unknown format"),
            }
        }

        if let Some(faker) = obj.get("faker") {
            let name = faker.as_str().ok_or(Reason::Malformed {
                keyword: "faker",
                expected: "a string",
            })?;

            match hint::find_hint(name) {
                Some(_) if has_length => return Err(Reason::LengthWithFormat("faker")),
                Some(hint) => return Ok(StringShape::Faker(hint)),
                None => tracing::debug!(%pointer, faker = name, "ignoring unknown faker hint"),
            }
        }

        let (min, max) = self.length_range(
            obj,
            "minLength",
            "maxLength",
            self.config.min_length,
            self.config.max_length,
        )?;

        Ok(StringShape::Random { min, max })
    }

    fn length_range(
        &self,
        obj: &Map<String, Value>,
        min_keyword: &'static str,
        max_keyword: &'static str,
        default_min: usize,
        default_max: usize,
    ) -> Result<(usize, usize), Reason> {
        let min = length(obj, min_keyword)?;
        let max = length(obj, max_keyword)?;

        let (min, max) = match (min, max) {
            (None, None) => (default_min, default_max),
            (Some(min), None) => (min, default_max.max(min)),
            (None, Some(max)) => (default_min.min(max), max),
            (Some(min), Some(max)) => (min, max),
        };

        if min > max {
            return Err(Reason::EmptyRange(min_keyword));
        }

        if min > MAX_GENERATED_LENGTH {
            return Err(Reason::TooLong {
                keyword: min_keyword,
                limit: MAX_GENERATED_LENGTH,
            });
        }

        Ok((min, max.min(MAX_GENERATED_LENGTH)))
    }

    fn number_range(&self, obj: &Map<String, Value>) -> Result<NumberRange, Reason> {
        if obj.contains_key("multipleOf") {
            return Err(Reason::UnsupportedKeyword("multipleOf".to_owned()));
        }

        let (min, max) = self.bounds(obj)?;
        let (min, exclusive_min) = min;
        let (max, exclusive_max) = max;

        if !(max - min).is_finite() {
            return Err(Reason::Malformed {
                keyword: "maximum",
                expected: "within a finite distance of the minimum",
            });
        }

        let range = NumberRange {
            min,
            max,
            exclusive_min,
            exclusive_max,
        };

        if range.fallback().is_none() {
            return Err(Reason::EmptyRange("minimum"));
        }

        Ok(range)
    }

    fn integer_range(&self, obj: &Map<String, Value>) -> Result<IntegerRange, Reason> {
        let ((min, exclusive_min), (max, exclusive_max)) = self.bounds(obj)?;

        let min = if exclusive_min { min.floor() + 1.0 } else { min.ceil() };
        let max = if exclusive_max { max.ceil() - 1.0 } else { max.floor() };

        if min >= I64_END {
            return Err(Reason::OutOfRange("minimum"));
        }

        if max < -I64_END {
            return Err(Reason::OutOfRange("maximum"));
        }

        // `as` saturates, which only ever tightens the range from here.
        let (min, max) = (min as i64, max as i64);

        let step = match obj.get("multipleOf") {
            None => 1,
            Some(step) => {
                let step = step.as_f64().filter(|s| *s > 0.0).ok_or(Reason::Malformed {
                    keyword: "multipleOf",
                    expected: "a positive number",
                })?;

                if step.fract() != 0.0 {
                    return Err(Reason::UnsupportedKeyword("multipleOf".to_owned()));
                }

                if step >= I64_END {
                    return Err(Reason::OutOfRange("multipleOf"));
                }

                step as i64
            }
        };

        let min = min.div_euclid(step) + if min.rem_euclid(step) == 0 { 0 } else { 1 };
        let max = max.div_euclid(step);

        if min > max {
            return Err(Reason::EmptyRange("minimum"));
        }

        Ok(IntegerRange { min, max, step })
    }

    // Resolves the lower and upper bound of a numeric schema, each paired
    // with whether it is exclusive. Missing bounds come from the config.
    fn bounds(&self, obj: &Map<String, Value>) -> Result<((f64, bool), (f64, bool)), Reason> {
        let min = bound(obj, "minimum", "exclusiveMinimum", |declared, exclusive| declared > exclusive)?;
        let max = bound(obj, "maximum", "exclusiveMaximum", |declared, exclusive| declared < exclusive)?;

        let (default_min, default_max) = (self.config.min_number, self.config.max_number);
        let span = default_max - default_min;

        Ok(match (min, max) {
            (None, None) => ((default_min, false), (default_max, false)),
            (Some(min), None) => {
                let max = if min.0 < default_max { default_max } else { min.0 + span.max(1.0) };
                (min, (max, false))
            }
            (None, Some(max)) => {
                let min = if max.0 > default_min { default_min } else { max.0 - span.max(1.0) };
                ((min, false), max)
            }
            (Some(min), Some(max)) => (min, max),
        })
    }
}

// Reads one side of a numeric range, accepting both the draft 4 form
// (`exclusiveMinimum: true` modifying `minimum`) and the draft 6+ form
// (`exclusiveMinimum: <number>`). When both a declared and an exclusive bound
// are present, `tighter(declared, exclusive)` says whether the declared one
// wins.
fn bound(
    obj: &Map<String, Value>,
    keyword: &'static str,
    exclusive_keyword: &'static str,
    tighter: impl Fn(f64, f64) -> bool,
) -> Result<Option<(f64, bool)>, Reason> {
    let declared = number(obj, keyword)?;

    Ok(match obj.get(exclusive_keyword) {
        None => declared.map(|n| (n, false)),
        Some(Value::Bool(exclusive)) => declared.map(|n| (n, *exclusive)),
        Some(_) => {
            let exclusive = number(obj, exclusive_keyword)?.unwrap_or_default();
            match declared {
                Some(n) if tighter(n, exclusive) => Some((n, false)),
                _ => Some((exclusive, true)),
            }
        }
    })
}

fn number(obj: &Map<String, Value>, keyword: &'static str) -> Result<Option<f64>, Reason> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or(Reason::Malformed {
            keyword,
            expected: "a number",
        }),
    }
}

fn length(obj: &Map<String, Value>, keyword: &'static str) -> Result<Option<usize>, Reason> {
    match obj.get(keyword) {
        None => Ok(None),
        // `as` saturates, so an integral float like 1e30 still reads as huge.
        Some(value) => value
            .as_u64()
            .or_else(|| value.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .map(|n| Some(usize::try_from(n).unwrap_or(usize::MAX)))
            .ok_or(Reason::Malformed {
                keyword,
                expected: "a non-negative integer",
            }),
    }
}

// Whether `value` meets the keywords declared on `obj` for at least one of
// `types`. Only what the schema states counts here, never config defaults,
// which is what keeps `enum` and `const` members honest.
fn satisfies(obj: &Map<String, Value>, types: &[Type], value: &Value) -> Result<bool, Reason> {
    for &type_ in types {
        if type_.accepts(value) && satisfies_typed(type_, obj, value)? {
            return Ok(true);
        }
    }

    Ok(false)
}

fn satisfies_typed(type_: Type, obj: &Map<String, Value>, value: &Value) -> Result<bool, Reason> {
    Ok(match (type_, value) {
        (Type::Integer, Value::Number(n)) | (Type::Number, Value::Number(n)) => {
            let n = match n.as_f64() {
                Some(n) => n,
                None => return Ok(false),
            };

            let min = bound(obj, "minimum", "exclusiveMinimum", |declared, exclusive| declared > exclusive)?;
            let max = bound(obj, "maximum", "exclusiveMaximum", |declared, exclusive| declared < exclusive)?;

            let above = min.map_or(true, |(min, exclusive)| if exclusive { n > min } else { n >= min });
            let below = max.map_or(true, |(max, exclusive)| if exclusive { n < max } else { n <= max });

            let multiple = match number(obj, "multipleOf")? {
                None => true,
                Some(step) if step > 0.0 => (n / step).fract() == 0.0,
                Some(_) => {
                    return Err(Reason::Malformed {
                        keyword: "multipleOf",
                        expected: "a positive number",
                    })
                }
            };

            above && below && multiple
        }

        (Type::String, Value::String(s)) => {
            let len = s.chars().count();
            let long_enough = length(obj, "minLength")?.map_or(true, |min| len >= min);
            let short_enough = length(obj, "maxLength")?.map_or(true, |max| len <= max);

            let formatted = match obj.get("format").and_then(Value::as_str).and_then(Format::from_name) {
                Some(format) => format.accepts(s),
                None => true,
            };

            long_enough && short_enough && formatted
        }

        (Type::Array, Value::Array(elements)) => {
            let len = elements.len();
            if !length(obj, "minItems")?.map_or(true, |min| len >= min)
                || !length(obj, "maxItems")?.map_or(true, |max| len <= max)
            {
                return Ok(false);
            }

            match obj.get("items") {
                Some(items @ Value::Object(_)) => {
                    for element in elements {
                        if !satisfies_schema(items, element)? {
                            return Ok(false);
                        }
                    }

                    true
                }
                _ => true,
            }
        }

        (Type::Object, Value::Object(members)) => {
            if let Some(Value::Array(names)) = obj.get("required") {
                if !names.iter().filter_map(Value::as_str).all(|name| members.contains_key(name)) {
                    return Ok(false);
                }
            }

            let properties = obj.get("properties").and_then(Value::as_object);
            let closed = obj.get("additionalProperties") == Some(&Value::Bool(false));

            for (name, member) in members {
                match properties.and_then(|p| p.get(name)) {
                    Some(schema) => {
                        if !satisfies_schema(schema, member)? {
                            return Ok(false);
                        }
                    }
                    None if closed => return Ok(false),
                    None => {}
                }
            }

            true
        }

        _ => true,
    })
}

// Checks a member of an `enum` or `const` against a nested schema. `$ref`s
// are not followed, and a nested schema without `type` accepts anything.
fn satisfies_schema(schema: &Value, value: &Value) -> Result<bool, Reason> {
    let obj = match schema.as_object() {
        Some(obj) if !obj.contains_key("$ref") => obj,
        _ => return Ok(true),
    };

    let types = match obj.get("type") {
        Some(Value::String(name)) => vec![parse_type(name)?],
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .map(parse_type)
            .collect::<Result<Vec<_>, _>>()?,
        _ => return Ok(true),
    };

    if obj.get("const").map_or(false, |c| c != value) {
        return Ok(false);
    }

    if let Some(Value::Array(members)) = obj.get("enum") {
        if !members.contains(value) {
            return Ok(false);
        }
    }

    satisfies(obj, &types, value)
}

fn parse_type(name: &str) -> Result<Type, Reason> {
    Type::from_name(name).ok_or_else(|| Reason::UnknownType(name.to_owned()))
}

fn type_malformed() -> Reason {
    Reason::Malformed {
        keyword: "type",
        expected: "a type name or a non-empty array of type names",
    }
}

// Rejects definitions that reach themselves through `$ref`. Generation
// follows every reference, so a cycle could never terminate reliably.
fn check_acyclic(definitions: &BTreeMap<String, Node>) -> Result<(), UnsupportedSchemaError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        name: &'a str,
        definitions: &'a BTreeMap<String, Node>,
        marks: &mut BTreeMap<&'a str, Mark>,
    ) -> Result<(), UnsupportedSchemaError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                return Err(UnsupportedSchemaError::new(
                    &format!("/definitions/{}", escape(name)),
                    Reason::CyclicRef(name.to_owned()),
                ))
            }
            None => {}
        }

        marks.insert(name, Mark::Visiting);

        let mut refs = Vec::new();
        if let Some(node) = definitions.get(name) {
            collect_refs(node, &mut refs);
        }

        for next in refs {
            visit(next, definitions, marks)?;
        }

        marks.insert(name, Mark::Done);
        Ok(())
    }

    let mut marks = BTreeMap::new();
    for name in definitions.keys() {
        visit(name, definitions, &mut marks)?;
    }

    Ok(())
}

fn collect_refs<'a>(node: &'a Node, out: &mut Vec<&'a str>) {
    match node {
        Node::Ref(name) => out.push(name),
        Node::Const(_) | Node::Enum(_) => {}
        Node::Types(types) => {
            for typed in types {
                match typed {
                    Typed::Array(array) => collect_refs(&array.items, out),
                    Typed::Object(object) => {
                        for property in &object.properties {
                            collect_refs(&property.schema, out);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

// JSON Pointer escaping, RFC 6901 section 3.
fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
