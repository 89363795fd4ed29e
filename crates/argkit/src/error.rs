use thiserror::Error;

use crate::model::{GroupId, OptionId};

/// Failure while building an [`OptionModel`](crate::OptionModel).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("duplicate option: {name}")]
    DuplicateOption { name: String },

    #[error("option must have a short or a long name")]
    Unnamed,

    #[error("invalid short option name: {name:?}")]
    InvalidShortName { name: char },

    #[error("invalid long option name: {name:?}")]
    InvalidLongName { name: String },

    #[error("option {key} declares a fixed arity of zero")]
    ZeroArity { key: String },

    #[error("option {key} allows no values")]
    EmptyAllowedValues { key: String },
}

/// A required option or group that did not appear on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Option { option: OptionId, key: String },
    Group { group: GroupId, members: Vec<String> },
}

impl Missing {
    /// Display form used in error messages (`b`, or `[a, b]` for a group).
    pub fn display(&self) -> String {
        match self {
            Self::Option { key, .. } => key.clone(),
            Self::Group { members, .. } => format!("[{}]", members.join(", ")),
        }
    }
}

/// Parse-time failure. Every variant aborts the parse call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unrecognized option: {token}")]
    UnrecognizedOption { token: String },

    #[error("missing argument for option: {key}")]
    MissingArgument { option: OptionId, key: String },

    #[error("{}", format_missing(missing))]
    MissingOptions { missing: Vec<Missing> },

    #[error("ambiguous option: {fragment} (could be: {})", candidates.join(", "))]
    AmbiguousOption {
        fragment: String,
        candidates: Vec<String>,
    },

    #[error("option {key} cannot be used with {selected}: both belong to the same group")]
    AlreadySelected {
        group: GroupId,
        option: OptionId,
        key: String,
        selected: String,
    },

    #[error("invalid value for option {key}: {value}")]
    InvalidValue {
        option: OptionId,
        key: String,
        value: String,
    },
}

impl ParseError {
    /// The raw token for unrecognized/ambiguous errors.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::UnrecognizedOption { token } => Some(token),
            Self::AmbiguousOption { fragment, .. } => Some(fragment),
            _ => None,
        }
    }

    /// The offending option, when the error is about a single option.
    pub fn option(&self) -> Option<OptionId> {
        match self {
            Self::MissingArgument { option, .. }
            | Self::AlreadySelected { option, .. }
            | Self::InvalidValue { option, .. } => Some(*option),
            _ => None,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

fn format_missing(missing: &[Missing]) -> String {
    let names: Vec<String> = missing.iter().map(Missing::display).collect();
    if names.len() == 1 {
        format!("missing required option: {}", names[0])
    } else {
        format!("missing required options: {}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_message_lists_every_entry() {
        let err = ParseError::MissingOptions {
            missing: vec![
                Missing::Option {
                    option: OptionId(1),
                    key: "b".to_string(),
                },
                Missing::Option {
                    option: OptionId(2),
                    key: "c".to_string(),
                },
            ],
        };
        assert_eq!(err.to_string(), "missing required options: b, c");

        let err = ParseError::MissingOptions {
            missing: vec![Missing::Group {
                group: GroupId(0),
                members: vec!["a".to_string(), "b".to_string()],
            }],
        };
        assert_eq!(err.to_string(), "missing required option: [a, b]");
    }

    #[test]
    fn ambiguous_message_names_candidates() {
        let err = ParseError::AmbiguousOption {
            fragment: "--ver".to_string(),
            candidates: vec!["version".to_string(), "verbose".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "ambiguous option: --ver (could be: version, verbose)"
        );
        assert_eq!(err.token(), Some("--ver"));
    }
}
