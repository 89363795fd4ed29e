use argkit::{Arity, LayeredCommandLine, OptionModel, ParseError, ValueValidator};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct OptionRow {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    pub arity: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub default_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupRow {
    pub index: usize,
    pub required: bool,
    pub members: Vec<String>,
}

/// Summary of a model, as printed by `argkit check`.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub name: String,
    pub source: String,
    pub options: Vec<OptionRow>,
    pub groups: Vec<GroupRow>,
}

/// Outcome of `argkit parse`.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub present: Vec<String>,
    pub values: IndexMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, IndexMap<String, String>>,
    pub positionals: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

pub fn arity_label(arity: Arity) -> String {
    let bound = match arity {
        Arity::None => return "flag".to_string(),
        Arity::One { .. } => "1".to_string(),
        Arity::Fixed { count, .. } => count.to_string(),
        Arity::Unbounded { .. } => "*".to_string(),
    };
    if arity.is_optional() {
        format!("0..{bound}")
    } else {
        bound
    }
}

pub fn check_label(validator: &ValueValidator) -> String {
    match validator {
        ValueValidator::OneOf(allowed) => format!("one of {}", allowed.join("|")),
        ValueValidator::Url { scheme: None } => "url".to_string(),
        ValueValidator::Url {
            scheme: Some(scheme),
        } => format!("{scheme} url"),
    }
}

pub fn check_report(name: &str, source: &str, model: &OptionModel) -> CheckReport {
    let options = model
        .options()
        .map(|(id, spec)| OptionRow {
            key: spec.key(),
            short: spec.short.map(String::from),
            long: spec.long.clone(),
            arity: arity_label(spec.arity),
            required: spec.required,
            group: model.group_of(id).map(|g| g.index()),
            default_values: spec.default_values.clone(),
            check: spec.validator.as_ref().map(check_label),
        })
        .collect();

    let groups = model
        .groups()
        .map(|(gid, group)| GroupRow {
            index: gid.index(),
            required: group.is_required(),
            members: group
                .members()
                .iter()
                .map(|&m| model.spec(m).key())
                .collect(),
        })
        .collect();

    CheckReport {
        name: name.to_string(),
        source: source.to_string(),
        options,
        groups,
    }
}

/// Report every option present in any layer, keyed by its command-line form.
pub fn parse_report(model: &OptionModel, layered: &LayeredCommandLine<'_, '_>) -> ParseReport {
    let mut values = IndexMap::new();
    let mut properties = IndexMap::new();

    for (_, spec) in model.options() {
        let key = spec.key();
        if !layered.has_option(&key) {
            continue;
        }
        let display = spec.display_name();
        let vals: Vec<String> = layered
            .values(&key)
            .into_iter()
            .map(str::to_string)
            .collect();

        if spec.value_separator.is_some() {
            let props: IndexMap<String, String> = layered
                .values_as_properties(&key)
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            properties.insert(display.clone(), props);
        }
        values.insert(display, vals);
    }

    ParseReport {
        present: layered.triggers().into_iter().collect(),
        values,
        properties,
        positionals: layered
            .positionals()
            .iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

pub fn error_report(err: &ParseError) -> ErrorReport {
    let (error, candidates, missing) = match err {
        ParseError::UnrecognizedOption { .. } => ("unrecognized-option", Vec::new(), Vec::new()),
        ParseError::MissingArgument { .. } => ("missing-argument", Vec::new(), Vec::new()),
        ParseError::MissingOptions { missing } => (
            "missing-options",
            Vec::new(),
            missing.iter().map(|m| m.display()).collect(),
        ),
        ParseError::AmbiguousOption { candidates, .. } => {
            ("ambiguous-option", candidates.clone(), Vec::new())
        }
        ParseError::AlreadySelected { .. } => ("already-selected", Vec::new(), Vec::new()),
        ParseError::InvalidValue { .. } => ("invalid-value", Vec::new(), Vec::new()),
    };

    ErrorReport {
        error,
        message: err.to_string(),
        token: err.token().map(str::to_string),
        candidates,
        missing,
    }
}
