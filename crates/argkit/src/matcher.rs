//! Long-option name resolution, including unambiguous abbreviations.

use crate::error::{ParseError, ParseResult};
use crate::model::{OptionId, OptionModel};

/// Resolve `name` (dashes already stripped) against the model's long names.
///
/// `fragment` is the text reported when the abbreviation is ambiguous, i.e.
/// the name as the user typed it, dashes included.
///
/// - exact match wins even when other names share the prefix
/// - a single prefix match resolves
/// - several prefix matches are [`ParseError::AmbiguousOption`]
/// - no match is `Ok(None)`
pub fn resolve_long(
    model: &OptionModel,
    name: &str,
    fragment: &str,
) -> ParseResult<Option<OptionId>> {
    if name.is_empty() {
        return Ok(None);
    }
    if let Some(id) = model.lookup_long(name) {
        return Ok(Some(id));
    }

    let candidates = model.long_names_with_prefix(name);
    match candidates.as_slice() {
        [] => Ok(None),
        [only] => Ok(model.lookup_long(only)),
        _ => Err(ParseError::AmbiguousOption {
            fragment: fragment.to_string(),
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
        }),
    }
}

/// Longest registered long name that is a strict prefix of `body` and accepts
/// a value (`-Xmx512m` => `Xmx` + `512m`).
pub fn attached_long_value<'a>(model: &OptionModel, body: &'a str) -> Option<(OptionId, &'a str)> {
    (1..body.len())
        .rev()
        .filter(|&split| body.is_char_boundary(split))
        .find_map(|split| {
            let id = model.lookup_long(&body[..split])?;
            model
                .spec(id)
                .arity
                .takes_value()
                .then(|| (id, &body[split..]))
        })
}
