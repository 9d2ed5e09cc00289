use crate::config::Config;
use crate::error::{ConfigError, UnsupportedSchemaError};
use crate::schema::{IntegerRange, Node, NumberRange, ObjectShape, Schema, StringShape, Typed};
use rand::Rng;
use serde_json::Value;

/// Generates values satisfying JSON Schema documents under a fixed [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: Config,
}

impl Generator {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compiles `schema` once, so that many values can be generated from it.
    pub fn compile(&self, schema: &Value) -> Result<Schema, UnsupportedSchemaError> {
        Schema::compile_with_config(schema, &self.config)
    }

    /// Generates a single value satisfying `schema`.
    ///
    /// Any problem with the schema is reported before the RNG is touched.
    pub fn generate<R: Rng>(
        &self,
        schema: &Value,
        rng: &mut R,
    ) -> Result<Value, UnsupportedSchemaError> {
        Ok(self.compile(schema)?.fake(rng))
    }
}

impl Schema {
    /// Generates a single random value satisfying this schema.
    ///
    /// The output is purely a function of the schema, the config it was
    /// compiled with, and the RNG.
    pub fn fake<R: Rng>(&self, rng: &mut R) -> Value {
        self.fake_node(&self.root, rng)
    }

    fn fake_node<R: Rng>(&self, node: &Node, rng: &mut R) -> Value {
        match node {
            // Compilation checked that every ref names a definition, and that
            // no definition reaches itself.
            Node::Ref(name) => self.fake_node(&self.definitions[name], rng),
            Node::Const(value) => value.clone(),
            Node::Enum(values) => values[rng.gen_range(0..values.len())].clone(),
            Node::Types(types) => self.fake_typed(&types[rng.gen_range(0..types.len())], rng),
        }
    }

    fn fake_typed<R: Rng>(&self, typed: &Typed, rng: &mut R) -> Value {
        match typed {
            Typed::Null => Value::Null,
            Typed::Boolean => rng.gen::<bool>().into(),
            Typed::Integer(range) => fake_integer(range, rng).into(),
            Typed::Number(range) => fake_number(range, rng).into(),
            Typed::String(shape) => fake_string(shape, rng).into(),
            Typed::Array(array) => (0..rng.gen_range(array.min_items..=array.max_items))
                .map(|_| self.fake_node(&array.items, rng))
                .collect::<Vec<_>>()
                .into(),
            Typed::Object(object) => self.fake_object(object, rng),
        }
    }

    fn fake_object<R: Rng>(&self, object: &ObjectShape, rng: &mut R) -> Value {
        let mut members = serde_json::Map::new();

        for property in &object.properties {
            if !property.required && !rng.gen_bool(self.optional_probability) {
                continue;
            }

            let value = self.fake_node(&property.schema, rng);
            members.insert(property.name.clone(), value);
        }

        members.into()
    }
}

fn fake_integer<R: Rng>(range: &IntegerRange, rng: &mut R) -> i64 {
    rng.gen_range(range.min..=range.max).saturating_mul(range.step)
}

fn fake_number<R: Rng>(range: &NumberRange, rng: &mut R) -> f64 {
    if range.min == range.max {
        return range.min;
    }

    let n = rng.gen_range(range.min..=range.max);
    if range.contains(n) {
        return n;
    }

    // Only reachable by landing on an excluded endpoint. Compilation checked
    // that some value lies inside.
    range.fallback().unwrap_or(range.min)
}

fn fake_string<R: Rng>(shape: &StringShape, rng: &mut R) -> String {
    match *shape {
        StringShape::Random { min, max } => (0..rng.gen_range(min..=max))
            .map(|_| rng.gen_range(32u8..=126u8) as char)
            .collect(),
        StringShape::Format(format) => format.fake(rng),
        // A hint only compiles if it names a registered faker.
        StringShape::Faker(hint) => crate::hint::fake_hint(hint, rng).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use serde_json::json;

    #[test]
    fn test_fake_primitives() {
        assert_valid_fake(json!({ "type": "null" }));
        assert_valid_fake(json!({ "type": "boolean" }));
        assert_valid_fake(json!({ "type": "integer" }));
        assert_valid_fake(json!({ "type": "number" }));
        assert_valid_fake(json!({ "type": "string" }));
        assert_valid_fake(json!({ "type": ["string", "null"] }));
        assert_valid_fake(json!({ "type": ["integer", "boolean", "array"], "items": { "type": "null" } }));
    }

    #[test]
    fn test_fake_numeric_bounds() {
        assert_valid_fake(json!({ "type": "integer", "minimum": 0, "maximum": 120 }));
        assert_valid_fake(json!({ "type": "integer", "minimum": -3, "maximum": -3 }));
        assert_valid_fake(json!({ "type": "integer", "exclusiveMinimum": 0, "exclusiveMaximum": 3 }));
        assert_valid_fake(json!({ "type": "integer", "minimum": -100, "maximum": 100, "multipleOf": 7 }));
        assert_valid_fake(json!({ "type": "integer", "minimum": 1000000 }));
        assert_valid_fake(json!({ "type": "number", "minimum": 0.5, "maximum": 0.75 }));
        assert_valid_fake(json!({ "type": "number", "exclusiveMinimum": 0, "exclusiveMaximum": 1 }));
        assert_valid_fake(json!({ "type": "number", "maximum": -50000.5 }));
        assert_valid_fake(json!({ "type": "number", "exclusiveMinimum": 1.0, "exclusiveMaximum": 1.0000000000000004 }));
        assert_valid_fake(json!({ "type": "integer", "minimum": -1e19, "maximum": -9e18 }));
    }

    #[test]
    fn test_fake_number_avoids_excluded_endpoints() {
        let range = NumberRange {
            min: 1.0,
            max: 1.0000000000000004,
            exclusive_min: true,
            exclusive_max: true,
        };

        let mut rng = rand_pcg::Pcg32::seed_from_u64(8927);
        for _ in 0..1000 {
            assert_eq!(fake_number(&range, &mut rng), 1.0000000000000002);
        }
    }

    #[test]
    fn test_fake_strings() {
        assert_valid_fake(json!({ "type": "string", "minLength": 3, "maxLength": 5 }));
        assert_valid_fake(json!({ "type": "string", "minLength": 30 }));
        assert_valid_fake(json!({ "type": "string", "format": "date-time" }));
        assert_valid_fake(json!({ "type": "string", "format": "date" }));
        assert_valid_fake(json!({ "type": "string", "format": "ipv4" }));
        assert_valid_fake(json!({ "type": "string", "format": "ipv6" }));
        assert_valid_fake(json!({ "type": "string", "faker": "en_us/names/full_name" }));
        assert_valid_fake(json!({ "type": "string", "format": "email" }));
        assert_valid_fake(json!({ "type": "string", "format": "hostname" }));
        assert_valid_fake(json!({ "type": "string", "format": "int32", "maxLength": 3 }));
        assert_valid_fake(json!({ "type": ["integer", "string"], "format": "int32" }));
        assert_valid_fake(json!({ "type": "string", "maxLength": 1_000_000_000u64 }));
    }

    #[test]
    fn test_fake_enum_and_const() {
        assert_valid_fake(json!({ "type": "string", "enum": ["a", "b", "c"] }));
        assert_valid_fake(json!({ "type": "integer", "enum": [1, 2, 3] }));
        assert_valid_fake(json!({ "type": ["string", "null"], "enum": ["a", null, 7] }));
        assert_valid_fake(json!({ "type": "object", "const": { "fixed": true } }));
        assert_valid_fake(json!({ "type": "integer", "enum": [1, 500], "maximum": 100 }));
        assert_valid_fake(json!({ "type": "string", "enum": ["a", "abcdef"], "maxLength": 3 }));
        assert_valid_fake(json!({ "type": "string", "format": "ipv4", "enum": ["10.0.0.1", "nope"] }));
        assert_valid_fake(json!({
            "type": "object",
            "properties": { "a": { "type": "integer", "maximum": 3 } },
            "required": ["a"],
            "enum": [{ "a": 1 }, { "a": 9 }, {}],
        }));
    }

    #[test]
    fn test_fake_array() {
        assert_valid_fake(json!({ "type": "array", "items": { "type": "integer" } }));
        assert_valid_fake(json!({
            "type": "array",
            "items": { "type": "string", "enum": ["x", "y"] },
            "minItems": 2,
            "maxItems": 4,
        }));
    }

    #[test]
    fn test_fake_object() {
        assert_valid_fake(json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer" },
                "b": { "type": "string" },
                "c": {
                    "type": "object",
                    "properties": { "d": { "type": "boolean" } },
                    "required": ["d"],
                    "additionalProperties": false,
                },
            },
            "required": ["a"],
            "additionalProperties": false,
        }));
    }

    #[test]
    fn test_fake_ref() {
        assert_valid_fake(json!({
            "definitions": {
                "a": { "type": "string", "format": "date-time" },
                "b": { "type": ["string", "null"] },
                "c": { "$ref": "#/definitions/b" },
            },
            "type": "object",
            "properties": {
                "a": { "$ref": "#/definitions/a" },
                "b": { "$ref": "#/definitions/b" },
                "c": { "$ref": "#/definitions/c" },
            },
            "required": ["a", "b", "c"],
        }));
    }

    #[test]
    fn test_required_keys_and_order() {
        let schema = json!({
            "type": "object",
            "properties": {
                "z": { "type": "null" },
                "y": { "type": "null" },
                "x": { "type": "null" },
                "w": { "type": "null" },
            },
            "required": ["y", "w"],
        });

        let declared = ["z", "y", "x", "w"];
        let mut rng = rand_pcg::Pcg32::seed_from_u64(8927);
        let schema = Schema::compile(&schema).unwrap();

        for _ in 0..1000 {
            let instance = schema.fake(&mut rng);
            let keys: Vec<_> = instance.as_object().unwrap().keys().map(String::as_str).collect();

            assert!(keys.contains(&"y") && keys.contains(&"w"), "{}", instance);

            // Keys are a subsequence of the declared properties.
            let mut remaining = declared.iter();
            for key in &keys {
                assert!(remaining.any(|d| d == key), "{}", instance);
            }
        }
    }

    #[test]
    fn test_optional_probability() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "null" } },
        });

        let mut rng = rand_pcg::Pcg32::seed_from_u64(8927);

        let always = Generator::new(Config {
            optional_probability: 1.0,
            ..Config::default()
        })
        .unwrap();

        let never = Generator::new(Config {
            optional_probability: 0.0,
            ..Config::default()
        })
        .unwrap();

        for _ in 0..100 {
            assert_eq!(always.generate(&schema, &mut rng).unwrap(), json!({ "a": null }));
            assert_eq!(never.generate(&schema, &mut rng).unwrap(), json!({}));
        }
    }

    #[test]
    fn test_array_length_from_config() {
        let generator = Generator::new(Config {
            min_items: 2,
            max_items: 3,
            ..Config::default()
        })
        .unwrap();

        let schema = generator
            .compile(&json!({ "type": "array", "items": { "type": "boolean" } }))
            .unwrap();

        let mut rng = rand_pcg::Pcg32::seed_from_u64(8927);
        for _ in 0..1000 {
            let instance = schema.fake(&mut rng);
            let len = instance.as_array().unwrap().len();
            assert!((2..=3).contains(&len), "{}", instance);
        }
    }

    #[test]
    fn test_strings_are_printable_ascii() {
        let schema = Schema::compile(&json!({ "type": "string", "maxLength": 64 })).unwrap();
        let mut rng = rand_pcg::Pcg32::seed_from_u64(8927);

        for _ in 0..1000 {
            let instance = schema.fake(&mut rng);
            let s = instance.as_str().unwrap();
            assert!(s.len() <= 64);
            assert!(s.bytes().all(|b| (32..=126).contains(&b)), "{:?}", s);
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let schema = json!({
            "type": "array",
            "items": { "type": ["integer", "string"] },
        });

        let generator = Generator::default();
        let mut a = rand_pcg::Pcg32::seed_from_u64(42);
        let mut b = rand_pcg::Pcg32::seed_from_u64(42);

        for _ in 0..100 {
            assert_eq!(
                generator.generate(&schema, &mut a).unwrap(),
                generator.generate(&schema, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn test_invalid_config() {
        let err = Generator::new(Config {
            min_length: 9,
            max_length: 1,
            ..Config::default()
        })
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvertedRange { field: "length", .. }));
    }

    fn assert_valid_fake(schema: Value) {
        let mut rng = rand_pcg::Pcg32::seed_from_u64(8927);
        let compiled = Schema::compile(&schema).unwrap();
        let validator = jsonschema::JSONSchema::compile(&schema).unwrap();

        // Poor man's fuzzing.
        for _ in 0..1000 {
            let instance = compiled.fake(&mut rng);
            assert!(validator.is_valid(&instance), "{}", instance);
        }
    }
}
