use crate::error::ConfigError;
use serde::Deserialize;

/// The policy a [`Generator`](crate::Generator) applies wherever a schema
/// leaves a choice open.
///
/// Bounds declared in a schema always win. The ranges here are only used to
/// fill in a bound the schema does not declare. All ranges are inclusive.
///
/// `Config` deserializes from camelCase JSON, with every field optional:
///
/// ```
/// let config: jsonschema_fake::Config =
///     serde_json::from_str(r#"{ "maxItems": 2, "optionalProbability": 1.0 }"#).unwrap();
///
/// assert_eq!(config.max_items, 2);
/// assert_eq!(config.min_length, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Chance that a property not listed in `required` is generated.
    pub optional_probability: f64,
    pub min_items: usize,
    pub max_items: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub min_number: f64,
    pub max_number: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            optional_probability: 0.5,
            min_items: 0,
            max_items: 5,
            min_length: 0,
            max_length: 8,
            min_number: -10_000.0,
            max_number: 10_000.0,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Written so that NaN is rejected too.
        if !(0.0..=1.0).contains(&self.optional_probability) {
            return Err(ConfigError::Probability(self.optional_probability));
        }

        if !self.min_number.is_finite() {
            return Err(ConfigError::NotFinite("minimum number"));
        }

        if !self.max_number.is_finite() {
            return Err(ConfigError::NotFinite("maximum number"));
        }

        if !(self.max_number - self.min_number).is_finite() {
            return Err(ConfigError::NotFinite("number range"));
        }

        check_range("items", self.min_items, self.max_items)?;
        check_range("length", self.min_length, self.max_length)?;
        check_range("number", self.min_number, self.max_number)?;

        Ok(())
    }
}

fn check_range<T: PartialOrd + ToString>(
    field: &'static str,
    min: T,
    max: T,
) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange {
            field,
            min: min.to_string(),
            max: max.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config = serde_json::from_str(r#"{ "minNumber": 0, "maxNumber": 1 }"#).unwrap();
        assert_eq!(
            config,
            Config {
                min_number: 0.0,
                max_number: 1.0,
                ..Config::default()
            }
        );

        assert!(serde_json::from_str::<Config>(r#"{ "maxDepth": 3 }"#).is_err());
    }

    #[test]
    fn test_validate_probability() {
        for p in &[-0.1, 1.5, f64::NAN] {
            let config = Config {
                optional_probability: *p,
                ..Config::default()
            };

            assert!(matches!(config.validate(), Err(ConfigError::Probability(_))));
        }
    }

    #[test]
    fn test_validate_ranges() {
        let config = Config {
            min_items: 4,
            max_items: 3,
            ..Config::default()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedRange {
                field: "items",
                min: "4".to_owned(),
                max: "3".to_owned(),
            })
        );

        let config = Config {
            min_number: f64::MIN,
            max_number: f64::MAX,
            ..Config::default()
        };

        assert_eq!(config.validate(), Err(ConfigError::NotFinite("number range")));
    }
}
