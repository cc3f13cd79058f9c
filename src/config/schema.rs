//! Declarative environment schema and its validator.
//!
//! A [`Schema`] lists the keys a configuration section reads together with
//! their type, whether they are required, and a literal default. Validation is
//! a pure function over a raw `KEY -> value` map: it either produces a
//! [`ValidatedEnv`] holding typed values, or a [`ConfigError`] that lists every
//! offending key at once.
//!
//! ```rust,ignore
//! let env = Schema::new("Auth Config")
//!     .field(FieldSpec::string("JWT_ACCESS_SECRET").required().non_empty())
//!     .field(FieldSpec::duration("JWT_ACCESS_EXPIRES_IN").default("3600s"))
//!     .validate(&raw)?;
//!
//! let ttl = env.duration("JWT_ACCESS_EXPIRES_IN")?;
//! ```

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use validator::ValidateEmail;

use crate::utils::duration::parse_duration_ms;

/// 100 years; longer lifetimes overflow token expiry timestamps.
const MAX_DURATION_MS: u64 = 3_155_760_000_000;

/// A single key that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub key: String,
    pub message: String,
}

impl FieldIssue {
    fn new(key: &str, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Configuration could not be built from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One section rejected one or more keys.
    #[error("[{namespace}] ENV validation failed: {}", format_issues(.issues))]
    Validation {
        namespace: String,
        issues: Vec<FieldIssue>,
    },

    /// Several sections failed; reported together.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    Multiple(Vec<ConfigError>),

    /// A cross-field rule was violated after every section parsed.
    #[error("invalid configuration: {0}")]
    Invariant(String),
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.key, issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ConfigError {
    /// Every failing key across all nested errors, in report order.
    pub fn issues(&self) -> Vec<&FieldIssue> {
        match self {
            Self::Validation { issues, .. } => issues.iter().collect(),
            Self::Multiple(errors) => errors.iter().flat_map(Self::issues).collect(),
            Self::Invariant(_) => Vec::new(),
        }
    }
}

/// Value type a key is coerced into.
#[derive(Debug, Clone)]
pub enum FieldKind {
    String { non_empty: bool },
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    Duration,
    Url,
    Email,
    OneOf(&'static [&'static str]),
}

/// One entry of a [`Schema`].
#[derive(Debug, Clone)]
pub struct FieldSpec {
    key: &'static str,
    kind: FieldKind,
    required: bool,
    default: Option<&'static str>,
}

impl FieldSpec {
    fn new(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            kind,
            required: false,
            default: None,
        }
    }

    pub fn string(key: &'static str) -> Self {
        Self::new(key, FieldKind::String { non_empty: false })
    }

    pub fn integer(key: &'static str) -> Self {
        Self::new(key, FieldKind::Integer {
            min: None,
            max: None,
        })
    }

    pub fn boolean(key: &'static str) -> Self {
        Self::new(key, FieldKind::Boolean)
    }

    pub fn duration(key: &'static str) -> Self {
        Self::new(key, FieldKind::Duration)
    }

    pub fn url(key: &'static str) -> Self {
        Self::new(key, FieldKind::Url)
    }

    pub fn email(key: &'static str) -> Self {
        Self::new(key, FieldKind::Email)
    }

    pub fn one_of(key: &'static str, allowed: &'static [&'static str]) -> Self {
        Self::new(key, FieldKind::OneOf(allowed))
    }

    /// The key must be present (and non-blank) unless a default is given.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Literal used when the key is absent. Defaults go through the same
    /// coercion as real values.
    pub fn default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub fn non_empty(mut self) -> Self {
        if let FieldKind::String { non_empty } = &mut self.kind {
            *non_empty = true;
        }
        self
    }

    /// Inclusive bounds for integer keys.
    pub fn range(mut self, lower: i64, upper: i64) -> Self {
        if let FieldKind::Integer { min, max } = &mut self.kind {
            *min = Some(lower);
            *max = Some(upper);
        }
        self
    }

    pub fn min(mut self, lower: i64) -> Self {
        if let FieldKind::Integer { min, .. } = &mut self.kind {
            *min = Some(lower);
        }
        self
    }

    fn is_unset_when_blank(&self) -> bool {
        matches!(self.kind, FieldKind::String { non_empty: false })
            && !self.required
            && self.default.is_none()
    }

    fn coerce(&self, raw: &str) -> Result<ConfigValue, String> {
        let value = raw.trim();
        match &self.kind {
            FieldKind::String { non_empty } => {
                if *non_empty && value.is_empty() {
                    Err("must not be empty".to_string())
                } else {
                    Ok(ConfigValue::String(value.to_string()))
                }
            }
            FieldKind::Integer { min, max } => {
                let parsed: i64 = value
                    .parse()
                    .map_err(|_| format!("expected an integer, got '{value}'"))?;
                if let Some(min) = min
                    && parsed < *min
                {
                    return Err(format!("must be at least {min}, got {parsed}"));
                }
                if let Some(max) = max
                    && parsed > *max
                {
                    return Err(format!("must be at most {max}, got {parsed}"));
                }
                Ok(ConfigValue::Integer(parsed))
            }
            FieldKind::Boolean => match value.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(ConfigValue::Boolean(true)),
                "false" | "0" => Ok(ConfigValue::Boolean(false)),
                _ => Err(format!("expected 'true' or 'false', got '{value}'")),
            },
            FieldKind::Duration => {
                let ms = parse_duration_ms(value).map_err(|e| e.to_string())?;
                if ms > MAX_DURATION_MS {
                    return Err(format!("duration '{value}' exceeds the 100y maximum"));
                }
                Ok(ConfigValue::Duration(ParsedDuration {
                    raw: value.to_string(),
                    ms,
                }))
            }
            FieldKind::Url => match url::Url::parse(value) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                    Ok(ConfigValue::String(value.to_string()))
                }
                Ok(parsed) => Err(format!(
                    "URL scheme must be http or https, got '{}'",
                    parsed.scheme()
                )),
                Err(e) => Err(format!("invalid URL '{value}': {e}")),
            },
            FieldKind::Email => {
                if value.validate_email() {
                    Ok(ConfigValue::String(value.to_string()))
                } else {
                    Err(format!("invalid email address '{value}'"))
                }
            }
            FieldKind::OneOf(allowed) => {
                let lowered = value.to_ascii_lowercase();
                if allowed.contains(&lowered.as_str()) {
                    Ok(ConfigValue::String(lowered))
                } else {
                    Err(format!(
                        "expected one of [{}], got '{value}'",
                        allowed.join(", ")
                    ))
                }
            }
        }
    }
}

/// A duration key, keeping the original text next to its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDuration {
    pub raw: String,
    pub ms: u64,
}

impl ParsedDuration {
    pub fn as_std(&self) -> Duration {
        Duration::from_millis(self.ms)
    }

    pub fn as_chrono(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.ms).unwrap_or(i64::MAX))
    }
}

/// A coerced configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Duration(ParsedDuration),
}

/// A named group of field specs, validated together.
#[derive(Debug, Clone)]
pub struct Schema {
    namespace: &'static str,
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(namespace: &'static str) -> Self {
        Self {
            namespace,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Validates `raw` against every field.
    ///
    /// Defaults apply only to absent keys; a present but blank value is
    /// coerced like any other and fails for non-string kinds. Blank optional
    /// strings without a default are left unset. Keys not named by the schema
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] listing every missing or malformed
    /// key, not only the first.
    pub fn validate(&self, raw: &HashMap<String, String>) -> Result<ValidatedEnv, ConfigError> {
        let mut values = HashMap::with_capacity(self.fields.len());
        let mut issues = Vec::new();

        for field in &self.fields {
            let source = match (raw.get(field.key), field.default) {
                (Some(value), _) if value.trim().is_empty() && field.is_unset_when_blank() => {
                    continue;
                }
                (Some(value), _) => value.as_str(),
                (None, Some(default)) => default,
                (None, None) if field.required => {
                    issues.push(FieldIssue::new(field.key, "is required"));
                    continue;
                }
                (None, None) => continue,
            };

            match field.coerce(source) {
                Ok(value) => {
                    values.insert(field.key, value);
                }
                Err(message) => issues.push(FieldIssue::new(field.key, message)),
            }
        }

        if issues.is_empty() {
            Ok(ValidatedEnv {
                namespace: self.namespace,
                values,
            })
        } else {
            Err(ConfigError::Validation {
                namespace: self.namespace.to_string(),
                issues,
            })
        }
    }
}

/// Typed view over a validated section.
///
/// Accessors only fail when asked for a key the schema never declared or
/// with the wrong type, which is a programming error surfaced as
/// [`ConfigError`] rather than a panic.
#[derive(Debug, Clone)]
pub struct ValidatedEnv {
    namespace: &'static str,
    values: HashMap<&'static str, ConfigValue>,
}

impl ValidatedEnv {
    fn mismatch(&self, key: &str, expected: &str) -> ConfigError {
        ConfigError::Validation {
            namespace: self.namespace.to_string(),
            issues: vec![FieldIssue::new(key, format!("no {expected} value"))],
        }
    }

    pub fn string(&self, key: &str) -> Result<String, ConfigError> {
        self.optional_string(key)
            .ok_or_else(|| self.mismatch(key, "string"))
    }

    pub fn optional_string(&self, key: &str) -> Option<String> {
        match self.values.get(key) {
            Some(ConfigValue::String(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Integer value converted to the target width.
    pub fn integer<T: TryFrom<i64>>(&self, key: &str) -> Result<T, ConfigError> {
        match self.values.get(key) {
            Some(ConfigValue::Integer(value)) => {
                T::try_from(*value).map_err(|_| ConfigError::Validation {
                    namespace: self.namespace.to_string(),
                    issues: vec![FieldIssue::new(key, format!("{value} is out of range"))],
                })
            }
            _ => Err(self.mismatch(key, "integer")),
        }
    }

    pub fn boolean(&self, key: &str) -> Result<bool, ConfigError> {
        match self.values.get(key) {
            Some(ConfigValue::Boolean(value)) => Ok(*value),
            _ => Err(self.mismatch(key, "boolean")),
        }
    }

    pub fn duration(&self, key: &str) -> Result<ParsedDuration, ConfigError> {
        match self.values.get(key) {
            Some(ConfigValue::Duration(value)) => Ok(value.clone()),
            _ => Err(self.mismatch(key, "duration")),
        }
    }
}
