//! Option models as configuration files.
//!
//! A [`ModelDef`] is the serde form of an [`OptionModel`]: it is what the
//! `argkit` binary reads from `argkit.json`, and what other tools can emit to
//! describe their options without linking against the parser.

use argkit::{Arity, ModelError, OptionGroup, OptionModel, OptionSpec, ValueValidator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only `format-version` this crate understands.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("unsupported format-version {found} (expected 1)")]
    UnsupportedVersion { found: u32 },

    #[error("short name must be a single character: {name:?}")]
    InvalidShort { name: String },

    #[error("option {key} combines allowed-values with a url check")]
    ConflictingChecks { key: String },
}

/// Value count of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ArityDef {
    #[default]
    None,
    One,
    Fixed {
        count: usize,
    },
    Unbounded,
}

impl ArityDef {
    fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn to_arity(self, optional: bool) -> Arity {
        match (self, optional) {
            (Self::None, _) => Arity::None,
            (Self::One, false) => Arity::one(),
            (Self::One, true) => Arity::optional_one(),
            (Self::Fixed { count }, false) => Arity::fixed(count),
            (Self::Fixed { count }, true) => Arity::optional_fixed(count),
            (Self::Unbounded, false) => Arity::unbounded(),
            (Self::Unbounded, true) => Arity::optional_unbounded(),
        }
    }

    pub fn from_arity(arity: Arity) -> (Self, bool) {
        match arity {
            Arity::None => (Self::None, false),
            Arity::One { optional } => (Self::One, optional),
            Arity::Fixed { count, optional } => (Self::Fixed { count }, optional),
            Arity::Unbounded { optional } => (Self::Unbounded, optional),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct OptionDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "ArityDef::is_none")]
    pub arity: ArityDef,
    #[serde(default)]
    pub optional_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_separator: Option<char>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_values: Vec<String>,
    /// Every parsed value must be one of these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    /// Every parsed value must be an absolute URL.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub url: bool,
    /// Required URL scheme; implies `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_scheme: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl OptionDef {
    pub fn to_spec(&self) -> Result<OptionSpec, SchemaError> {
        let short = match self.short.as_deref() {
            None => None,
            Some(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => {
                        return Err(SchemaError::InvalidShort {
                            name: s.to_string(),
                        });
                    }
                }
            }
        };

        let url = self.url || self.url_scheme.is_some();
        let validator = match (self.allowed_values.is_empty(), url) {
            (true, false) => None,
            (false, false) => Some(ValueValidator::OneOf(self.allowed_values.clone())),
            (true, true) => Some(ValueValidator::Url {
                scheme: self.url_scheme.clone(),
            }),
            (false, true) => {
                return Err(SchemaError::ConflictingChecks {
                    key: self.short.clone().or_else(|| self.long.clone()).unwrap_or_default(),
                });
            }
        };

        Ok(OptionSpec {
            short,
            long: self.long.clone(),
            arity: self.arity.to_arity(self.optional_value),
            required: self.required,
            value_separator: self.value_separator,
            default_values: self.default_values.clone(),
            validator,
            description: (!self.description.is_empty()).then(|| self.description.clone()),
        })
    }

    pub fn from_spec(spec: &OptionSpec) -> Self {
        let (arity, optional_value) = ArityDef::from_arity(spec.arity);
        let (allowed_values, url, url_scheme) = match &spec.validator {
            None => (Vec::new(), false, None),
            Some(ValueValidator::OneOf(allowed)) => (allowed.clone(), false, None),
            Some(ValueValidator::Url { scheme }) => (Vec::new(), true, scheme.clone()),
        };
        Self {
            short: spec.short.map(String::from),
            long: spec.long.clone(),
            required: spec.required,
            arity,
            optional_value,
            value_separator: spec.value_separator,
            default_values: spec.default_values.clone(),
            allowed_values,
            url,
            url_scheme,
            description: spec.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct GroupDef {
    #[serde(default)]
    pub required: bool,
    pub options: Vec<OptionDef>,
}

/// Top-level document of an `argkit.json` file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ModelDef {
    pub format_version: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupDef>,
}

impl ModelDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            name: name.into(),
            options: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, SchemaError> {
        let def: Self = serde_json::from_str(s)?;
        if def.format_version != FORMAT_VERSION {
            return Err(SchemaError::UnsupportedVersion {
                found: def.format_version,
            });
        }
        Ok(def)
    }

    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the option model: standalone options first, then groups, each
    /// in file order.
    pub fn build(&self) -> Result<OptionModel, SchemaError> {
        let mut model = OptionModel::new();
        for def in &self.options {
            model.register(def.to_spec()?)?;
        }
        for group in &self.groups {
            let mut staged = OptionGroup::new().required(group.required);
            for def in &group.options {
                staged = staged.option(def.to_spec()?);
            }
            model.register_group(staged)?;
        }
        Ok(model)
    }
}
