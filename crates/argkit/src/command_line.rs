use indexmap::IndexMap;

use crate::model::{OptionId, OptionModel, OptionSpec};

/// Result of a successful parse.
///
/// Values borrow from the parsed `argv` and from the model's declared defaults.
/// Query names may be given as `b`, `-b`, `bfile` or `--bfile`; unknown names
/// read as absent.
#[derive(Debug, Clone)]
pub struct CommandLine<'a> {
    model: &'a OptionModel,
    /// One entry per option seen, in order of first appearance. Each inner
    /// `Vec` holds the values of one occurrence.
    occurrences: IndexMap<OptionId, Vec<Vec<&'a str>>>,
    positionals: Vec<&'a str>,
}

impl<'a> CommandLine<'a> {
    pub(crate) fn new(model: &'a OptionModel) -> Self {
        Self {
            model,
            occurrences: IndexMap::new(),
            positionals: Vec::new(),
        }
    }

    pub(crate) fn begin_occurrence(&mut self, option: OptionId) {
        self.occurrences.entry(option).or_default().push(Vec::new());
    }

    pub(crate) fn push_value(&mut self, option: OptionId, value: &'a str) {
        let occurrences = self.occurrences.entry(option).or_default();
        match occurrences.last_mut() {
            Some(current) => current.push(value),
            None => occurrences.push(vec![value]),
        }
    }

    pub(crate) fn push_positional(&mut self, value: &'a str) {
        self.positionals.push(value);
    }
}

impl<'a> CommandLine<'a> {
    pub fn model(&self) -> &'a OptionModel {
        self.model
    }

    /// Whether the option appeared on the command line.
    pub fn has(&self, option: OptionId) -> bool {
        self.occurrences.contains_key(&option)
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.model.resolve(name).is_some_and(|id| self.has(id))
    }

    /// Options present, in order of first appearance.
    pub fn present(&self) -> impl Iterator<Item = (OptionId, &'a OptionSpec)> + '_ {
        let model = self.model;
        self.occurrences.keys().map(move |&id| (id, model.spec(id)))
    }

    /// Values parsed for `option`, all occurrences flattened. No defaults.
    pub fn parsed_values(&self, option: OptionId) -> Vec<&'a str> {
        self.occurrences
            .get(&option)
            .map(|occ| occ.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// Per-occurrence values of an option (`-J a b -J c d` gives two entries).
    pub fn occurrences(&self, name: &str) -> &[Vec<&'a str>] {
        self.model
            .resolve(name)
            .and_then(|id| self.occurrences.get(&id))
            .map(|occ| occ.as_slice())
            .unwrap_or(&[])
    }

    /// First value of the option.
    ///
    /// Falls back to the first declared default when no value was parsed,
    /// including when the option appeared without one.
    pub fn value(&self, name: &str) -> Option<&'a str> {
        let id = self.model.resolve(name)?;
        self.first_parsed(id)
            .or_else(|| self.model.spec(id).default_values.first().map(|s| s.as_str()))
    }

    /// First parsed value, otherwise `default`.
    ///
    /// A default supplied at lookup time takes precedence over the declared one.
    pub fn value_or(&self, name: &str, default: &'a str) -> &'a str {
        self.model
            .resolve(name)
            .and_then(|id| self.first_parsed(id))
            .unwrap_or(default)
    }

    /// All parsed values of the option, or its declared defaults when none
    /// were parsed.
    pub fn values(&self, name: &str) -> Vec<&'a str> {
        self.values_or(name, &[])
    }

    /// All values of the option.
    ///
    /// Precedence: parsed values, then `defaults` (when non-empty), then the
    /// defaults declared on the option. An occurrence without values counts
    /// as no parsed values, as in [`value_or`](Self::value_or).
    pub fn values_or(&self, name: &str, defaults: &[&'a str]) -> Vec<&'a str> {
        let Some(id) = self.model.resolve(name) else {
            return defaults.to_vec();
        };
        let parsed = self.parsed_values(id);
        if !parsed.is_empty() {
            return parsed;
        }
        if !defaults.is_empty() {
            return defaults.to_vec();
        }
        self.model
            .spec(id)
            .default_values
            .iter()
            .map(|s| s.as_str())
            .collect()
    }

    /// Key/value pairs of a separator option (`-Dkey=value`).
    ///
    /// An occurrence with a single value maps that key to `"true"`.
    pub fn values_as_properties(&self, name: &str) -> IndexMap<&'a str, &'a str> {
        let mut props = IndexMap::new();
        for occ in self.occurrences(name) {
            match occ.as_slice() {
                [] => {}
                [key] => {
                    props.insert(*key, "true");
                }
                [key, value, ..] => {
                    props.insert(*key, *value);
                }
            }
        }
        props
    }

    /// Arguments not consumed as options or option values.
    pub fn positionals(&self) -> &[&'a str] {
        &self.positionals
    }

    fn first_parsed(&self, option: OptionId) -> Option<&'a str> {
        self.occurrences
            .get(&option)?
            .iter()
            .flatten()
            .next()
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arity, OptionSpec};

    fn model() -> OptionModel {
        let mut m = OptionModel::new();
        m.register(OptionSpec::short('a')).unwrap();
        m.register(
            OptionSpec::short('o')
                .long("output")
                .takes_value()
                .default_values(["out.txt"]),
        )
        .unwrap();
        m.register(
            OptionSpec::short('D')
                .arity(Arity::optional_fixed(2))
                .value_separator('='),
        )
        .unwrap();
        m
    }

    #[test]
    fn query_time_defaults_follow_precedence() {
        let m = model();
        let o = m.lookup_short('o').unwrap();

        // declared default
        let cl = CommandLine::new(&m);
        assert!(!cl.has_option("o"));
        assert_eq!(cl.value("output"), Some("out.txt"));
        assert_eq!(cl.values("o"), vec!["out.txt"]);

        // lookup default beats declared default
        assert_eq!(cl.value_or("o", "method.txt"), "method.txt");
        assert_eq!(cl.values_or("o", &["method.txt"]), vec!["method.txt"]);

        // parsed beats both
        let mut cl = CommandLine::new(&m);
        cl.begin_occurrence(o);
        cl.push_value(o, "parsed.txt");
        assert_eq!(cl.value("o"), Some("parsed.txt"));
        assert_eq!(cl.value_or("--output", "method.txt"), "parsed.txt");
        assert_eq!(cl.values_or("o", &["method.txt"]), vec!["parsed.txt"]);
    }

    #[test]
    fn flags_without_values_and_unknown_names() {
        let m = model();
        let mut cl = CommandLine::new(&m);
        cl.begin_occurrence(m.lookup_short('a').unwrap());
        assert!(cl.has_option("-a"));
        assert_eq!(cl.value("a"), None);
        assert!(cl.values("a").is_empty());
        assert!(!cl.has_option("zzz"));
        assert_eq!(cl.value("zzz"), None);
        assert_eq!(cl.value_or("zzz", "x"), "x");
    }

    #[test]
    fn present_option_without_values_falls_back_like_absent_one() {
        let mut m = OptionModel::new();
        let e = m
            .register(
                OptionSpec::short('e')
                    .arity(Arity::optional_one())
                    .default_values(["declared"]),
            )
            .unwrap();
        let mut cl = CommandLine::new(&m);
        cl.begin_occurrence(e);

        assert!(cl.has_option("e"));
        assert_eq!(cl.value("e"), Some("declared"));
        assert_eq!(cl.values("e"), vec!["declared"]);
        assert_eq!(cl.value_or("e", "lookup"), "lookup");
        assert_eq!(cl.values_or("e", &["lookup"]), vec!["lookup"]);
    }

    #[test]
    fn properties_from_occurrences() {
        let m = model();
        let d = m.lookup_short('D').unwrap();
        let mut cl = CommandLine::new(&m);
        cl.begin_occurrence(d);
        cl.push_value(d, "param1");
        cl.begin_occurrence(d);
        cl.push_value(d, "param2");
        cl.push_value(d, "value2");
        cl.begin_occurrence(d);

        let props = cl.values_as_properties("D");
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("param1"), Some(&"true"));
        assert_eq!(props.get("param2"), Some(&"value2"));
        assert_eq!(cl.occurrences("D").len(), 3);
        assert_eq!(cl.parsed_values(d), vec!["param1", "param2", "value2"]);
    }
}
