//! The parse state machine.
//!
//! [`step`] is a pure function of `(state, token)`: it returns the next state
//! and the effects the token has on the result. [`ParseEngine`] owns the
//! per-call mutable state (cursor, group selections, the result being built)
//! and applies those effects.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::command_line::CommandLine;
use crate::error::{Missing, ParseError, ParseResult};
use crate::model::{GroupId, OptionId, OptionModel};
use crate::tokenizer::{Token, Tokenizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Scanning,
    /// Values are being gathered for the most recently matched option.
    /// `collected` counts values of the current occurrence only.
    Collecting { option: OptionId, collected: usize },
    /// After `--` or the stop point: everything is positional.
    Verbatim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<'a> {
    /// Start a new occurrence of an option.
    Select(OptionId),
    Value(OptionId, &'a str),
    Positional(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<'a> {
    pub state: State,
    pub effects: Vec<Effect<'a>>,
}

impl<'a> Transition<'a> {
    fn to(state: State) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn positional(state: State, raw: &'a str) -> Self {
        Self {
            state,
            effects: vec![Effect::Positional(raw)],
        }
    }
}

/// Advance the state machine by one token.
pub fn step<'a>(
    model: &OptionModel,
    state: State,
    token: Token<'a>,
    stop_at_non_option: bool,
) -> ParseResult<Transition<'a>> {
    match state {
        State::Verbatim => Ok(Transition::positional(State::Verbatim, token.raw())),
        State::Collecting { option, collected } => match token {
            Token::Positional(raw) | Token::Unrecognized(raw)
                if model.spec(option).arity.accepts_more(collected) =>
            {
                let mut effects = Vec::new();
                let collected = push_values(model, option, collected, raw, &mut effects);
                Ok(Transition {
                    state: after_values(model, option, collected),
                    effects,
                })
            }
            token => {
                ensure_satisfied(model, state)?;
                scan(model, token, stop_at_non_option)
            }
        },
        State::Scanning => scan(model, token, stop_at_non_option),
    }
}

fn scan<'a>(
    model: &OptionModel,
    token: Token<'a>,
    stop_at_non_option: bool,
) -> ParseResult<Transition<'a>> {
    match token {
        Token::Separator => Ok(Transition::to(State::Verbatim)),
        Token::Positional(raw) if stop_at_non_option => {
            Ok(Transition::positional(State::Verbatim, raw))
        }
        Token::Positional(raw) => Ok(Transition::positional(State::Scanning, raw)),
        Token::Unrecognized(raw) if stop_at_non_option => {
            Ok(Transition::positional(State::Verbatim, raw))
        }
        Token::Unrecognized(raw) => Err(ParseError::UnrecognizedOption {
            token: raw.to_string(),
        }),
        Token::Long { option, value, .. } => Ok(select(model, option, value)),
        Token::ShortCluster { raw, hits, rest } => {
            if rest.is_some() && !stop_at_non_option {
                return Err(ParseError::UnrecognizedOption {
                    token: raw.to_string(),
                });
            }

            let mut transition = Transition::to(State::Scanning);
            for hit in &hits {
                let next = select(model, hit.option, hit.value);
                transition.state = next.state;
                transition.effects.extend(next.effects);
            }

            if let Some(rest) = rest {
                // Stop mode: keep what was recognized, hand the rest over verbatim.
                let leftover = if hits.is_empty() { raw } else { rest };
                transition.state = State::Verbatim;
                transition.effects.push(Effect::Positional(leftover));
            }
            Ok(transition)
        }
    }
}

fn select<'a>(model: &OptionModel, option: OptionId, inline: Option<&'a str>) -> Transition<'a> {
    let mut effects = vec![Effect::Select(option)];
    let collected = match inline {
        Some(raw) => push_values(model, option, 0, raw, &mut effects),
        None => 0,
    };
    Transition {
        state: after_values(model, option, collected),
        effects,
    }
}

/// Record `raw` as value(s) of `option`, splitting on its separator without
/// exceeding the room left in the occurrence. Returns the new count.
fn push_values<'a>(
    model: &OptionModel,
    option: OptionId,
    collected: usize,
    raw: &'a str,
    effects: &mut Vec<Effect<'a>>,
) -> usize {
    let spec = model.spec(option);
    let room = spec
        .arity
        .max_values()
        .map(|max| max.saturating_sub(collected).max(1));
    let before = effects.len();
    match (spec.value_separator, room) {
        (Some(sep), Some(room)) => {
            effects.extend(raw.splitn(room, sep).map(|v| Effect::Value(option, v)))
        }
        (Some(sep), None) => {
            effects.extend(raw.split(sep).map(|v| Effect::Value(option, v)))
        }
        (None, _) => effects.push(Effect::Value(option, raw)),
    }
    collected + (effects.len() - before)
}

fn after_values(model: &OptionModel, option: OptionId, collected: usize) -> State {
    if model.spec(option).arity.accepts_more(collected) {
        State::Collecting { option, collected }
    } else {
        State::Scanning
    }
}

fn ensure_satisfied(model: &OptionModel, state: State) -> ParseResult<()> {
    if let State::Collecting { option, collected } = state {
        let spec = model.spec(option);
        if spec.arity.is_unsatisfied(collected) {
            return Err(ParseError::MissingArgument {
                option,
                key: spec.key(),
            });
        }
    }
    Ok(())
}

/// Drives [`step`] over an argument vector.
///
/// One engine serves exactly one parse call; group selections live here and
/// never on the model, so a model can be reused freely.
#[derive(Debug)]
pub struct ParseEngine<'a> {
    model: &'a OptionModel,
    tokenizer: Tokenizer<'a>,
    stop_at_non_option: bool,
    check_required: bool,
    state: State,
    selected: HashMap<GroupId, OptionId>,
    command_line: CommandLine<'a>,
}

impl<'a> ParseEngine<'a> {
    pub fn new(model: &'a OptionModel) -> Self {
        Self {
            model,
            tokenizer: Tokenizer::new(model),
            stop_at_non_option: false,
            check_required: true,
            state: State::Scanning,
            selected: HashMap::new(),
            command_line: CommandLine::new(model),
        }
    }

    /// Treat the first non-option (or unknown option) and everything after
    /// it as positional arguments.
    pub fn stop_at_non_option(mut self, stop: bool) -> Self {
        self.stop_at_non_option = stop;
        self
    }

    /// Skip the end-of-input check for required options and groups. Used for
    /// layers that are validated together afterwards, see
    /// [`LayeredCommandLine::validate`](crate::LayeredCommandLine::validate).
    pub fn check_required(mut self, check: bool) -> Self {
        self.check_required = check;
        self
    }

    pub fn run<S: AsRef<str>>(mut self, argv: &'a [S]) -> ParseResult<CommandLine<'a>> {
        debug!(
            args = argv.len(),
            options = self.model.len(),
            stop_at_non_option = self.stop_at_non_option,
            "parsing command line"
        );

        let mut cursor = 0usize;
        while let Some(arg) = argv.get(cursor) {
            let arg = arg.as_ref();
            let token = match self.state {
                State::Verbatim => Token::Positional(arg),
                _ => self.tokenizer.classify(arg)?,
            };
            let Transition { state, effects } =
                step(self.model, self.state, token, self.stop_at_non_option)?;
            trace!(cursor, arg, from = ?self.state, to = ?state, "step");

            for effect in effects {
                self.apply(effect)?;
            }
            self.state = state;
            cursor += 1;
        }

        self.finish()
    }

    fn apply(&mut self, effect: Effect<'a>) -> ParseResult<()> {
        match effect {
            Effect::Select(option) => {
                if let Some(group) = self.model.group_of(option) {
                    match self.selected.get(&group).copied() {
                        Some(current) if current != option => {
                            return Err(ParseError::AlreadySelected {
                                group,
                                option,
                                key: self.model.spec(option).key(),
                                selected: self.model.spec(current).key(),
                            });
                        }
                        Some(_) => {}
                        None => {
                            self.selected.insert(group, option);
                        }
                    }
                }
                self.command_line.begin_occurrence(option);
            }
            Effect::Value(option, value) => {
                let spec = self.model.spec(option);
                if let Some(validator) = &spec.validator {
                    if !validator.accepts(value) {
                        return Err(ParseError::InvalidValue {
                            option,
                            key: spec.key(),
                            value: value.to_string(),
                        });
                    }
                }
                self.command_line.push_value(option, value);
            }
            Effect::Positional(value) => self.command_line.push_positional(value),
        }
        Ok(())
    }

    fn finish(self) -> ParseResult<CommandLine<'a>> {
        ensure_satisfied(self.model, self.state)?;

        if !self.check_required {
            return Ok(self.command_line);
        }
        let missing = missing_required(self.model, |id| self.command_line.has(id));
        if !missing.is_empty() {
            debug!(count = missing.len(), "required options missing");
            return Err(ParseError::MissingOptions { missing });
        }
        Ok(self.command_line)
    }
}

/// Required options and groups for which `present` finds nothing, in
/// registration order. A group is reported at the position of its first
/// member and counts as given when any member is present.
pub fn missing_required(model: &OptionModel, present: impl Fn(OptionId) -> bool) -> Vec<Missing> {
    let mut missing = Vec::new();
    for (id, spec) in model.options() {
        match model.group_of(id) {
            Some(gid) => {
                let group = model.group(gid);
                if group.members().first() == Some(&id)
                    && group.is_required()
                    && !group.members().iter().any(|&m| present(m))
                {
                    missing.push(Missing::Group {
                        group: gid,
                        members: group
                            .members()
                            .iter()
                            .map(|&m| model.spec(m).key())
                            .collect(),
                    });
                }
            }
            None => {
                if spec.required && !present(id) {
                    missing.push(Missing::Option {
                        option: id,
                        key: spec.key(),
                    });
                }
            }
        }
    }
    missing
}
