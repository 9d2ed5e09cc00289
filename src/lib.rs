//! Generate fake data from a JSON Schema document.
//!
//! # Quick start
//!
//! Here's how you can use [`generate`] to produce dummy data from a schema.
//!
//! ```
//! use serde_json::json;
//! use rand::SeedableRng;
//!
//! // An example schema we can generate from.
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "name": { "type": "string" },
//!         "age": { "type": "integer", "minimum": 0, "maximum": 120 }
//!     },
//!     "required": ["name"]
//! });
//!
//! // A hard-coded RNG, so that the output is predictable.
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(8927);
//!
//! let person = jsonschema_fake::generate(&schema, &mut rng).unwrap();
//! assert!(person["name"].is_string());
//! if let Some(age) = person.get("age") {
//!     assert!((0..=120).contains(&age.as_i64().unwrap()));
//! }
//! ```
//!
//! To generate many values from one schema, or to change the generation
//! policy, compile the schema once with a [`Generator`]:
//!
//! ```
//! use jsonschema_fake::{Config, Generator};
//! use rand::SeedableRng;
//! use serde_json::json;
//!
//! let generator = Generator::new(Config { max_items: 2, ..Config::default() }).unwrap();
//! let schema = generator
//!     .compile(&json!({ "type": "array", "items": { "type": "boolean" } }))
//!     .unwrap();
//!
//! let mut rng = rand_pcg::Pcg32::seed_from_u64(8927);
//! for _ in 0..10 {
//!     assert!(schema.fake(&mut rng).as_array().unwrap().len() <= 2);
//! }
//! ```

mod config;
mod error;
mod generator;
pub mod hint;
pub mod schema;

pub use config::Config;
pub use error::{ConfigError, Reason, UnsupportedSchemaError};
pub use generator::Generator;
pub use schema::Schema;

use rand::Rng;
use serde_json::Value;

/// Generates a single random JSON value satisfying a given schema, using the
/// default [`Config`].
///
/// The generated output is purely a function of the given schema and RNG.
/// Every problem with the schema is reported as an [`UnsupportedSchemaError`]
/// before anything is generated, so there is never partial output.
///
/// # Supported schemas
///
/// Every schema node must declare a `type`, either one of `null`, `boolean`,
/// `integer`, `number`, `string`, `array`, `object`, or a non-empty array of
/// those (one is picked at random per value). The exception is a node of the
/// form `{ "$ref": "#/definitions/name" }` (or `#/$defs/name`), which refers
/// to a definition at the root of the document.
///
/// The constraints that are honored are:
///
/// * `enum` and `const`, for every type. Members that violate the node's
///   other constraints (say, an `enum` member above `maximum`) are dropped.
/// * `properties` and `required` for objects. Properties not listed in
///   `required` are included with probability
///   [`Config::optional_probability`]. No other properties are generated, and
///   the output preserves the declaration order of `properties`.
/// * `items`, `minItems` and `maxItems` for arrays.
/// * `minLength`, `maxLength`, `format` and `faker` for strings.
/// * `minimum`, `maximum`, `exclusiveMinimum` and `exclusiveMaximum` (in both
///   the draft 4 boolean and the later numeric form) for numbers and integers,
///   and `multipleOf` for integers.
///
/// Keywords that would constrain data in ways this crate cannot honor, such
/// as `pattern` or `oneOf`, are rejected rather than ignored. A `format` this
/// crate does not know is only an annotation, and is ignored.
///
/// Strings and arrays are never generated longer than
/// [`schema::MAX_GENERATED_LENGTH`]; a `minLength` or `minItems` above it is
/// rejected.
///
/// # Invariants for generated data
///
/// The output of this function is not guaranteed to remain the same between
/// different versions of this crate.
///
/// Some properties which are guaranteed for this version of the crate:
///
/// * Bounds not declared by the schema come from the [`Config`]: by default
///   strings have at most eight characters, arrays at most five elements,
///   and numbers fall within -10000 and 10000.
///
/// * Generated strings without a `format` or `faker` are entirely printable
///   ASCII.
///
/// * Generated `date-time`, `date` and `time` strings have a random offset
///   from UTC of at most 14 hours, in whole minutes.
///
/// # Using `faker`
///
/// To generate a realistic sort of string, name one of the generators from
/// [`hint::HINTS`] in a `faker` keyword. For example, for a fake email:
///
/// ```
/// use serde_json::json;
/// use rand::SeedableRng;
///
/// let schema = json!({ "type": "string", "faker": "en_us/internet/email" });
///
/// let mut rng = rand_pcg::Pcg32::seed_from_u64(8927);
/// let email = jsonschema_fake::generate(&schema, &mut rng).unwrap();
/// assert!(email.as_str().unwrap().contains('@'));
/// ```
///
/// `faker` is only honored for strings, and cannot be combined with
/// `minLength` or `maxLength`. An unrecognized value is ignored, producing a
/// plain random string.
pub fn generate<R: Rng>(schema: &Value, rng: &mut R) -> Result<Value, UnsupportedSchemaError> {
    Generator::default().generate(schema, rng)
}
