//! Rule option schemas and their resolution from `[rules.<id>].options`.

use std::collections::BTreeMap;

use verity_core::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionDefault {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(&'static str),
}

/// One declared option: key, type (given by the default), and description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionSpec {
    pub key: &'static str,
    pub default: OptionDefault,
    pub description: &'static str,
}

impl OptionSpec {
    pub const fn integer(key: &'static str, default: i64, description: &'static str) -> Self {
        Self { key, default: OptionDefault::Integer(default), description }
    }

    pub const fn float(key: &'static str, default: f64, description: &'static str) -> Self {
        Self { key, default: OptionDefault::Float(default), description }
    }

    pub const fn boolean(key: &'static str, default: bool, description: &'static str) -> Self {
        Self { key, default: OptionDefault::Boolean(default), description }
    }

    pub const fn string(key: &'static str, default: &'static str, description: &'static str) -> Self {
        Self { key, default: OptionDefault::String(default), description }
    }

    fn type_name(&self) -> &'static str {
        match self.default {
            OptionDefault::Integer(_) => "an integer",
            OptionDefault::Float(_) => "a number",
            OptionDefault::Boolean(_) => "a boolean",
            OptionDefault::String(_) => "a string",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl From<OptionDefault> for OptionValue {
    fn from(default: OptionDefault) -> Self {
        match default {
            OptionDefault::Integer(v) => Self::Integer(v),
            OptionDefault::Float(v) => Self::Float(v),
            OptionDefault::Boolean(v) => Self::Boolean(v),
            OptionDefault::String(v) => Self::String(v.to_string()),
        }
    }
}

/// Option values for one rule instance: every declared key, defaulted or set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleOptions {
    values: BTreeMap<&'static str, OptionValue>,
}

impl RuleOptions {
    /// Resolve `table` against `schema`. Unknown keys and type mismatches fail.
    pub fn resolve(
        rule_id: &str,
        schema: &[OptionSpec],
        table: &toml::Table,
    ) -> Result<Self, ConfigError> {
        if let Some(key) = table.keys().find(|k| !schema.iter().any(|s| s.key == k.as_str())) {
            return Err(ConfigError::UnknownOption {
                rule: rule_id.to_string(),
                key: key.clone(),
            });
        }

        let mut values = BTreeMap::new();
        for spec in schema {
            let value = match table.get(spec.key) {
                None => OptionValue::from(spec.default),
                Some(raw) => convert(spec, raw).ok_or_else(|| ConfigError::OptionType {
                    rule: rule_id.to_string(),
                    key: spec.key.to_string(),
                    expected: spec.type_name(),
                    found: raw.type_str().to_string(),
                })?,
            };
            values.insert(spec.key, value);
        }
        Ok(Self { values })
    }

    /// All defaults.
    pub fn defaults(schema: &[OptionSpec]) -> Self {
        Self {
            values: schema
                .iter()
                .map(|spec| (spec.key, OptionValue::from(spec.default)))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            OptionValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            OptionValue::Float(v) => Some(*v),
            OptionValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            OptionValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            OptionValue::String(v) => Some(v),
            _ => None,
        }
    }
}

fn convert(spec: &OptionSpec, raw: &toml::Value) -> Option<OptionValue> {
    match (spec.default, raw) {
        (OptionDefault::Integer(_), toml::Value::Integer(v)) => Some(OptionValue::Integer(*v)),
        (OptionDefault::Float(_), toml::Value::Float(v)) => Some(OptionValue::Float(*v)),
        (OptionDefault::Float(_), toml::Value::Integer(v)) => Some(OptionValue::Float(*v as f64)),
        (OptionDefault::Boolean(_), toml::Value::Boolean(v)) => Some(OptionValue::Boolean(*v)),
        (OptionDefault::String(_), toml::Value::String(v)) => Some(OptionValue::String(v.clone())),
        _ => None,
    }
}
