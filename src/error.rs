use thiserror::Error;

/// Returned when a schema node cannot be turned into generated data.
///
/// This is the only error [`Generator::compile`](crate::Generator::compile)
/// and [`generate`](crate::generate) produce. `pointer` is the JSON Pointer
/// (RFC 6901) of the offending node within the schema document; the empty
/// string refers to the root.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unsupported schema at {}: {reason}", display_pointer(.pointer))]
pub struct UnsupportedSchemaError {
    pub pointer: String,
    pub reason: Reason,
}

impl UnsupportedSchemaError {
    pub(crate) fn new(pointer: &str, reason: Reason) -> Self {
        Self {
            pointer: pointer.to_owned(),
            reason,
        }
    }
}

fn display_pointer(pointer: &str) -> &str {
    if pointer.is_empty() {
        "(root)"
    } else {
        pointer
    }
}

/// Why a schema node was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Reason {
    #[error("schema node must be a JSON object")]
    NotAnObject,

    #[error("missing `type`")]
    MissingType,

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("`{keyword}` must be {expected}")]
    Malformed {
        keyword: &'static str,
        expected: &'static str,
    },

    #[error("`{0}` is not supported")]
    UnsupportedKeyword(String),

    #[error("`{0}` cannot be combined with `minLength` or `maxLength`")]
    LengthWithFormat(&'static str),

    #[error("constraints on `{0}` leave no value to generate")]
    EmptyRange(&'static str),

    #[error("`{0}` puts every integer outside the 64-bit range")]
    OutOfRange(&'static str),

    #[error("`{keyword}` exceeds the generation limit of {limit}")]
    TooLong {
        keyword: &'static str,
        limit: usize,
    },

    #[error("`enum` has no member satisfying the declared type and constraints")]
    EmptyEnum,

    #[error("`const` does not satisfy the declared type and constraints")]
    ConstMismatch,

    #[error("required property `{0}` is not declared in `properties`")]
    UndeclaredRequired(String),

    #[error("array schema has no `items`")]
    MissingItems,

    #[error("`$ref` to `{0}` cannot be resolved locally")]
    RemoteRef(String),

    #[error("`$ref` to unknown definition `{0}`")]
    UnknownRef(String),

    #[error("definition `{0}` refers back to itself")]
    CyclicRef(String),
}

/// Returned by [`Config::validate`](crate::Config::validate) for a generation
/// policy that cannot be applied.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("optional property probability must be within [0, 1], got {0}")]
    Probability(f64),

    #[error("minimum {field} ({min}) exceeds maximum ({max})")]
    InvertedRange {
        field: &'static str,
        min: String,
        max: String,
    },

    #[error("{0} must be finite")]
    NotFinite(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_pointer() {
        let err = UnsupportedSchemaError::new("/properties/age", Reason::EmptyRange("minimum"));
        assert_eq!(
            err.to_string(),
            "unsupported schema at /properties/age: constraints on `minimum` leave no value to generate"
        );

        let err = UnsupportedSchemaError::new("", Reason::MissingType);
        assert_eq!(err.to_string(), "unsupported schema at (root): missing `type`");
    }
}
