//! Declarative option registry.
//!
//! An [`OptionModel`] is built once and then shared by any number of parse
//! calls. Parsing never mutates it.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::ModelError;

/// Handle to a registered option. Ordered by registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionId(pub(crate) usize);

impl OptionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a registered group. Ordered by registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How many values an option consumes each time it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arity {
    /// Boolean flag.
    #[default]
    None,
    One {
        optional: bool,
    },
    Fixed {
        count: usize,
        optional: bool,
    },
    Unbounded {
        optional: bool,
    },
}

impl Arity {
    pub const fn one() -> Self {
        Self::One { optional: false }
    }

    pub const fn optional_one() -> Self {
        Self::One { optional: true }
    }

    pub const fn fixed(count: usize) -> Self {
        Self::Fixed {
            count,
            optional: false,
        }
    }

    pub const fn optional_fixed(count: usize) -> Self {
        Self::Fixed {
            count,
            optional: true,
        }
    }

    pub const fn unbounded() -> Self {
        Self::Unbounded { optional: false }
    }

    pub const fn optional_unbounded() -> Self {
        Self::Unbounded { optional: true }
    }

    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Upper bound on values per occurrence. `None` means unbounded.
    pub fn max_values(&self) -> Option<usize> {
        match self {
            Self::None => Some(0),
            Self::One { .. } => Some(1),
            Self::Fixed { count, .. } => Some(*count),
            Self::Unbounded { .. } => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            Self::None => true,
            Self::One { optional } | Self::Fixed { optional, .. } | Self::Unbounded { optional } => {
                *optional
            }
        }
    }

    /// Whether an occurrence holding `collected` values may take another one.
    pub fn accepts_more(&self, collected: usize) -> bool {
        self.takes_value() && self.max_values().is_none_or(|max| collected < max)
    }

    /// Whether an occurrence holding `collected` values is still short of its
    /// mandatory values.
    pub fn is_unsatisfied(&self, collected: usize) -> bool {
        if self.is_optional() {
            return false;
        }
        match self.max_values() {
            Some(max) => collected < max,
            None => collected == 0,
        }
    }
}

/// Check applied to every value an option consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueValidator {
    /// The value must equal one of these, case-sensitively.
    OneOf(Vec<String>),
    /// The value must be an absolute URL, with `scheme` when one is given.
    Url { scheme: Option<String> },
}

impl ValueValidator {
    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn url() -> Self {
        Self::Url { scheme: None }
    }

    pub fn url_with_scheme(scheme: impl Into<String>) -> Self {
        Self::Url {
            scheme: Some(scheme.into()),
        }
    }

    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::OneOf(allowed) => allowed.iter().any(|a| a == value),
            Self::Url { scheme } => url::Url::parse(value)
                .is_ok_and(|u| scheme.as_deref().is_none_or(|s| u.scheme() == s)),
        }
    }
}

/// Declaration of a single option.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionSpec {
    pub short: Option<char>,
    pub long: Option<String>,
    pub arity: Arity,
    pub required: bool,
    pub value_separator: Option<char>,
    /// Values reported when the option is absent from the command line.
    pub default_values: Vec<String>,
    /// Checked against parsed values only; defaults are trusted.
    pub validator: Option<ValueValidator>,
    pub description: Option<String>,
}

impl OptionSpec {
    /// Start a spec with a short name (`-b`).
    pub fn short(name: char) -> Self {
        Self {
            short: Some(name),
            ..Default::default()
        }
    }

    /// Start a spec with only a long name (`--version`).
    pub fn long_only(name: impl Into<String>) -> Self {
        Self {
            long: Some(name.into()),
            ..Default::default()
        }
    }

    /// Add (or replace) the long name.
    pub fn long(mut self, name: impl Into<String>) -> Self {
        self.long = Some(name.into());
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// Shorthand for `arity(Arity::one())`.
    pub fn takes_value(self) -> Self {
        self.arity(Arity::one())
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn set_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Split each value on `sep` (`-Dkey=value` style options).
    pub fn value_separator(mut self, sep: char) -> Self {
        self.value_separator = Some(sep);
        self
    }

    pub fn default_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn validator(mut self, validator: ValueValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Shorthand for `validator(ValueValidator::one_of(values))`.
    pub fn allowed_values<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validator(ValueValidator::one_of(values))
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Identifying name: the short name if present, otherwise the long name.
    pub fn key(&self) -> String {
        match (self.short, &self.long) {
            (Some(c), _) => c.to_string(),
            (None, Some(l)) => l.clone(),
            (None, None) => String::new(),
        }
    }

    /// Command-line form: `--long` when available, otherwise `-s`.
    pub fn display_name(&self) -> String {
        match (&self.long, self.short) {
            (Some(l), _) => format!("--{l}"),
            (None, Some(c)) => format!("-{c}"),
            (None, None) => String::new(),
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.short.is_none() && self.long.is_none() {
            return Err(ModelError::Unnamed);
        }
        if let Some(c) = self.short {
            if c == '-' || c == '=' || c.is_whitespace() {
                return Err(ModelError::InvalidShortName { name: c });
            }
        }
        if let Some(l) = &self.long {
            if l.is_empty() || l.starts_with('-') || l.contains('=') || l.contains(char::is_whitespace)
            {
                return Err(ModelError::InvalidLongName { name: l.clone() });
            }
        }
        if let Arity::Fixed { count: 0, .. } = self.arity {
            return Err(ModelError::ZeroArity { key: self.key() });
        }
        if matches!(&self.validator, Some(ValueValidator::OneOf(allowed)) if allowed.is_empty()) {
            return Err(ModelError::EmptyAllowedValues { key: self.key() });
        }
        Ok(())
    }
}

/// Declaration of a set of mutually exclusive options.
#[derive(Debug, Clone, Default)]
pub struct OptionGroup {
    options: Vec<OptionSpec>,
    required: bool,
}

impl OptionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.options.push(spec);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// A group as stored in the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    members: Vec<OptionId>,
    required: bool,
}

impl Group {
    pub fn members(&self) -> &[OptionId] {
        &self.members
    }

    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Registry of every option a parser recognizes.
#[derive(Debug, Clone, Default)]
pub struct OptionModel {
    specs: Vec<OptionSpec>,
    shorts: HashMap<char, OptionId>,
    longs: IndexMap<String, OptionId>,
    groups: Vec<Group>,
    membership: Vec<Option<GroupId>>,
}

impl OptionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a standalone option.
    pub fn register(&mut self, spec: OptionSpec) -> Result<OptionId, ModelError> {
        spec.validate()?;
        if let Some(c) = spec.short {
            if self.shorts.contains_key(&c) {
                return Err(ModelError::DuplicateOption {
                    name: c.to_string(),
                });
            }
        }
        if let Some(l) = &spec.long {
            if self.longs.contains_key(l) {
                return Err(ModelError::DuplicateOption { name: l.clone() });
            }
        }

        let id = OptionId(self.specs.len());
        if let Some(c) = spec.short {
            self.shorts.insert(c, id);
        }
        if let Some(l) = &spec.long {
            self.longs.insert(l.clone(), id);
        }
        self.specs.push(spec);
        self.membership.push(None);
        Ok(id)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, spec: OptionSpec) -> Result<Self, ModelError> {
        self.register(spec)?;
        Ok(self)
    }

    /// Register every member of `group` and record them as mutually exclusive.
    ///
    /// Members' own `required` flags are cleared: whether a selection is
    /// mandatory is decided by the group.
    pub fn register_group(&mut self, group: OptionGroup) -> Result<GroupId, ModelError> {
        // Check all names up front so a failing group leaves the model untouched.
        let mut staged = self.clone();
        let gid = GroupId(staged.groups.len());
        let mut members = Vec::with_capacity(group.options.len());
        for spec in group.options {
            let id = staged.register(spec.set_required(false))?;
            staged.membership[id.0] = Some(gid);
            members.push(id);
        }
        staged.groups.push(Group {
            members,
            required: group.required,
        });
        *self = staged;
        Ok(gid)
    }

    pub fn lookup_short(&self, name: char) -> Option<OptionId> {
        self.shorts.get(&name).copied()
    }

    pub fn lookup_long(&self, name: &str) -> Option<OptionId> {
        self.longs.get(name).copied()
    }

    /// Every long name starting with `prefix`, in registration order.
    pub fn long_names_with_prefix<'m>(&'m self, prefix: &str) -> Vec<&'m str> {
        let mut hits: Vec<(&str, OptionId)> = self
            .longs
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, id)| (name.as_str(), *id))
            .collect();
        hits.sort_by_key(|(_, id)| *id);
        hits.into_iter().map(|(name, _)| name).collect()
    }

    /// Resolve a query name such as `b`, `-b`, `bfile` or `--bfile`.
    pub fn resolve(&self, name: &str) -> Option<OptionId> {
        let bare = name.trim_start_matches('-');
        let mut chars = bare.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(id) = self.lookup_short(c) {
                return Some(id);
            }
        }
        self.lookup_long(bare)
    }

    pub fn spec(&self, id: OptionId) -> &OptionSpec {
        &self.specs[id.0]
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn group_of(&self, id: OptionId) -> Option<GroupId> {
        self.membership[id.0]
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Options in registration order.
    pub fn options(&self) -> impl Iterator<Item = (OptionId, &OptionSpec)> {
        self.specs.iter().enumerate().map(|(i, s)| (OptionId(i), s))
    }

    /// Groups in registration order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.groups.iter().enumerate().map(|(i, g)| (GroupId(i), g))
    }
}
