//! Classification of raw arguments into tokens.
//!
//! Classification needs the model: whether `-btoast` is a cluster, a short
//! option with an attached value, or a single-dash long option depends on
//! which names are registered and which of them take values.

use crate::error::ParseResult;
use crate::matcher;
use crate::model::{OptionId, OptionModel};

/// One option matched inside a token, with its inline value if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit<'a> {
    pub option: OptionId,
    pub value: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// The literal `--`.
    Separator,
    /// `--name`, `--name=value`, or a single-dash long form (`-name=value`).
    Long {
        raw: &'a str,
        option: OptionId,
        value: Option<&'a str>,
    },
    /// `-abc` / `-bvalue`. `rest` holds the tail starting at the first
    /// character that is not a registered short option.
    ShortCluster {
        raw: &'a str,
        hits: Vec<Hit<'a>>,
        rest: Option<&'a str>,
    },
    Positional(&'a str),
    Unrecognized(&'a str),
}

impl<'a> Token<'a> {
    /// The argument text this token was produced from.
    pub fn raw(&self) -> &'a str {
        match self {
            Self::Separator => "--",
            Self::Long { raw, .. } | Self::ShortCluster { raw, .. } => raw,
            Self::Positional(raw) | Self::Unrecognized(raw) => raw,
        }
    }

    /// Whether the token names at least one registered option.
    pub fn is_option(&self) -> bool {
        matches!(self, Self::Long { .. } | Self::ShortCluster { .. })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'m> {
    model: &'m OptionModel,
}

impl<'m> Tokenizer<'m> {
    pub fn new(model: &'m OptionModel) -> Self {
        Self { model }
    }

    /// Classify a single raw argument.
    ///
    /// Only an ambiguous long-option abbreviation is an error here; unknown
    /// options come back as [`Token::Unrecognized`] so the engine can decide
    /// (value position, stop-at-non-option mode).
    pub fn classify<'a>(&self, arg: &'a str) -> ParseResult<Token<'a>> {
        if arg == "--" {
            return Ok(Token::Separator);
        }
        if let Some(body) = arg.strip_prefix("--") {
            return self.classify_long(arg, body);
        }
        if let Some(body) = arg.strip_prefix('-') {
            if !body.is_empty() {
                return self.classify_single_dash(arg, body);
            }
        }
        Ok(Token::Positional(arg))
    }

    fn classify_long<'a>(&self, raw: &'a str, body: &'a str) -> ParseResult<Token<'a>> {
        let (name, value) = split_inline(body);
        let fragment = &raw[..2 + name.len()];
        match matcher::resolve_long(self.model, name, fragment)? {
            Some(option) => Ok(self.long_token(raw, option, value)),
            None => Ok(Token::Unrecognized(raw)),
        }
    }

    fn classify_single_dash<'a>(&self, raw: &'a str, body: &'a str) -> ParseResult<Token<'a>> {
        let (name, value) = split_inline(body);

        // `-b`, `-b=value`: a registered short name comes first.
        if let Some(c) = single_char(name) {
            if self.model.lookup_short(c).is_some() {
                return Ok(self.scan_cluster(raw, body));
            }
        }

        // `-foo=bar`, `-ver`
        let fragment = &raw[..1 + name.len()];
        if let Some(option) = matcher::resolve_long(self.model, name, fragment)? {
            return Ok(self.long_token(raw, option, value));
        }

        // `-Xmx512m`
        if value.is_none() {
            if let Some((option, attached)) = matcher::attached_long_value(self.model, body) {
                return Ok(Token::Long {
                    raw,
                    option,
                    value: Some(attached),
                });
            }
        }

        // `-abc`, `-btoast`, `-Dkey=value`
        if let Some(first) = body.chars().next() {
            if self.model.lookup_short(first).is_some() {
                return Ok(self.scan_cluster(raw, body));
            }
        }

        if is_negative_number(raw) {
            return Ok(Token::Positional(raw));
        }

        Ok(Token::Unrecognized(raw))
    }

    fn long_token<'a>(&self, raw: &'a str, option: OptionId, value: Option<&'a str>) -> Token<'a> {
        if value.is_some() && !self.model.spec(option).arity.takes_value() {
            return Token::Unrecognized(raw);
        }
        Token::Long { raw, option, value }
    }

    /// Walk `body` left to right. Flags are recorded; the first option that
    /// accepts a value takes the remainder of the argument (minus a leading
    /// `=`) and ends the scan.
    fn scan_cluster<'a>(&self, raw: &'a str, body: &'a str) -> Token<'a> {
        let mut hits = Vec::new();
        for (idx, c) in body.char_indices() {
            let Some(option) = self.model.lookup_short(c) else {
                return Token::ShortCluster {
                    raw,
                    hits,
                    rest: Some(&body[idx..]),
                };
            };
            if self.model.spec(option).arity.takes_value() {
                let tail = &body[idx + c.len_utf8()..];
                let value = if tail.is_empty() {
                    None
                } else {
                    Some(tail.strip_prefix('=').unwrap_or(tail))
                };
                hits.push(Hit { option, value });
                break;
            }
            hits.push(Hit {
                option,
                value: None,
            });
        }
        Token::ShortCluster {
            raw,
            hits,
            rest: None,
        }
    }
}

fn split_inline(body: &str) -> (&str, Option<&str>) {
    match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// `-` followed by `\d+(\.\d+)?`.
pub fn is_negative_number(arg: &str) -> bool {
    let Some(body) = arg.strip_prefix('-') else {
        return false;
    };
    let (int, frac) = match body.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (body, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(int) && frac.is_none_or(digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::model::{Arity, OptionSpec};

    /// `-a/--enable-a` flag, `-b/--bfile` value, `-c/--copt` flag.
    fn abc() -> OptionModel {
        let mut m = OptionModel::new();
        m.register(OptionSpec::short('a').long("enable-a")).unwrap();
        m.register(OptionSpec::short('b').long("bfile").takes_value())
            .unwrap();
        m.register(OptionSpec::short('c').long("copt")).unwrap();
        m
    }

    fn id(m: &OptionModel, c: char) -> OptionId {
        m.lookup_short(c).unwrap()
    }

    #[test]
    fn separator_and_plain_arguments() {
        let m = abc();
        let t = Tokenizer::new(&m);
        assert_eq!(t.classify("--").unwrap(), Token::Separator);
        assert_eq!(t.classify("foo").unwrap(), Token::Positional("foo"));
        assert_eq!(t.classify("-").unwrap(), Token::Positional("-"));
    }

    #[test]
    fn long_option_with_and_without_equals() {
        let m = abc();
        let t = Tokenizer::new(&m);
        assert_eq!(
            t.classify("--bfile=toast").unwrap(),
            Token::Long {
                raw: "--bfile=toast",
                option: id(&m, 'b'),
                value: Some("toast"),
            }
        );
        assert_eq!(
            t.classify("--copt").unwrap(),
            Token::Long {
                raw: "--copt",
                option: id(&m, 'c'),
                value: None,
            }
        );
        // A flag cannot carry an inline value.
        assert_eq!(
            t.classify("--copt=1").unwrap(),
            Token::Unrecognized("--copt=1")
        );
        assert_eq!(
            t.classify("--zop==1").unwrap(),
            Token::Unrecognized("--zop==1")
        );
    }

    #[test]
    fn bursting_stops_at_first_value_taking_option() {
        let m = abc();
        let t = Tokenizer::new(&m);
        let Token::ShortCluster { hits, rest, .. } = t.classify("-acbtoast").unwrap() else {
            panic!("expected cluster");
        };
        assert_eq!(rest, None);
        assert_eq!(
            hits,
            vec![
                Hit {
                    option: id(&m, 'a'),
                    value: None
                },
                Hit {
                    option: id(&m, 'c'),
                    value: None
                },
                Hit {
                    option: id(&m, 'b'),
                    value: Some("toast")
                },
            ]
        );
    }

    #[test]
    fn cluster_with_unknown_char_keeps_the_tail() {
        let m = abc();
        let t = Tokenizer::new(&m);
        let Token::ShortCluster { hits, rest, raw } = t.classify("-azc").unwrap() else {
            panic!("expected cluster");
        };
        assert_eq!(raw, "-azc");
        assert_eq!(hits.len(), 1);
        assert_eq!(rest, Some("zc"));
    }

    #[test]
    fn short_value_with_equals() {
        let mut m = OptionModel::new();
        let f = m
            .register(OptionSpec::short('f').long("foo").takes_value())
            .unwrap();
        let t = Tokenizer::new(&m);

        for arg in ["-f=bar", "-fbar"] {
            let Token::ShortCluster { hits, .. } = t.classify(arg).unwrap() else {
                panic!("expected cluster for {arg}");
            };
            assert_eq!(
                hits,
                vec![Hit {
                    option: f,
                    value: Some("bar")
                }]
            );
        }
        assert_eq!(
            t.classify("-foo=bar").unwrap(),
            Token::Long {
                raw: "-foo=bar",
                option: f,
                value: Some("bar"),
            }
        );
    }

    #[test]
    fn single_dash_long_beats_short_for_multi_char_names() {
        let mut m = OptionModel::new();
        let version = m.register(OptionSpec::long_only("version")).unwrap();
        m.register(OptionSpec::short('v').takes_value()).unwrap();
        let t = Tokenizer::new(&m);
        assert_eq!(
            t.classify("-ver").unwrap(),
            Token::Long {
                raw: "-ver",
                option: version,
                value: None,
            }
        );
    }

    #[test]
    fn single_dash_ambiguity_reports_typed_fragment() {
        let mut m = OptionModel::new();
        m.register(OptionSpec::long_only("version")).unwrap();
        m.register(OptionSpec::long_only("verbose").arity(Arity::optional_one()))
            .unwrap();
        let t = Tokenizer::new(&m);
        let err = t.classify("-ver=1").unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousOption { ref fragment, .. } if fragment == "-ver"));
    }

    #[test]
    fn negative_numbers_are_positional_unless_registered() {
        let m = abc();
        let t = Tokenizer::new(&m);
        assert_eq!(t.classify("-1").unwrap(), Token::Positional("-1"));
        assert_eq!(t.classify("-3.25").unwrap(), Token::Positional("-3.25"));
        assert_eq!(t.classify("-1x").unwrap(), Token::Unrecognized("-1x"));

        let mut m = OptionModel::new();
        let one = m.register(OptionSpec::short('1')).unwrap();
        let t = Tokenizer::new(&m);
        assert_eq!(
            t.classify("-1").unwrap(),
            Token::ShortCluster {
                raw: "-1",
                hits: vec![Hit {
                    option: one,
                    value: None
                }],
                rest: None,
            }
        );
    }

    #[test]
    fn negative_number_shape() {
        assert!(is_negative_number("-1"));
        assert!(is_negative_number("-10.5"));
        assert!(!is_negative_number("-"));
        assert!(!is_negative_number("-1."));
        assert!(!is_negative_number("-.5"));
        assert!(!is_negative_number("1"));
        assert!(!is_negative_number("--1"));
    }
}
