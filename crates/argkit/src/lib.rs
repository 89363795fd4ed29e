//! Declarative command-line option parsing.
//!
//! Options are registered once on an [`OptionModel`] and every call to
//! [`parse`] / [`parse_with`] produces an independent [`CommandLine`]:
//! - short options (`-b`), clusters (`-abc`) and attached values (`-btoast`, `-b=toast`)
//! - long options (`--bfile toast`, `--bfile=toast`), also written with a single dash
//! - unambiguous long-option abbreviations (`--ver` for `--version`)
//! - value separators (`-Dkey=value`), fixed and unbounded arities
//! - required options, mutually exclusive groups, the `--` terminator
//! - value checks (allowed values, URLs) applied as values are consumed
//!
//! ```
//! use argkit::{OptionModel, OptionSpec};
//!
//! let mut model = OptionModel::new();
//! model.register(OptionSpec::short('a')).unwrap();
//! model.register(OptionSpec::short('b').long("bfile").takes_value()).unwrap();
//!
//! let cl = argkit::parse(&model, &["-abtoast", "foo"]).unwrap();
//! assert!(cl.has_option("a"));
//! assert_eq!(cl.value("bfile"), Some("toast"));
//! assert_eq!(cl.positionals(), &["foo"]);
//! ```

mod command_line;
pub mod engine;
mod error;
mod layered;
pub mod matcher;
mod model;
pub mod tokenizer;

pub use command_line::CommandLine;
pub use engine::ParseEngine;
pub use error::{Missing, ModelError, ParseError, ParseResult};
pub use layered::LayeredCommandLine;
pub use model::{
    Arity, Group, GroupId, OptionGroup, OptionId, OptionModel, OptionSpec, ValueValidator,
};

/// Parse `argv` against `model`.
pub fn parse<'a, S: AsRef<str>>(
    model: &'a OptionModel,
    argv: &'a [S],
) -> ParseResult<CommandLine<'a>> {
    parse_with(model, argv, false)
}

/// Parse `argv` against `model`, optionally stopping option processing at the
/// first non-option argument.
pub fn parse_with<'a, S: AsRef<str>>(
    model: &'a OptionModel,
    argv: &'a [S],
    stop_at_non_option: bool,
) -> ParseResult<CommandLine<'a>> {
    ParseEngine::new(model)
        .stop_at_non_option(stop_at_non_option)
        .run(argv)
}

/// Parse one layer of a [`LayeredCommandLine`].
///
/// Required options and groups are not checked here since another layer may
/// supply them; call [`LayeredCommandLine::validate`] once all layers are in.
pub fn parse_layer<'a, S: AsRef<str>>(
    model: &'a OptionModel,
    argv: &'a [S],
    stop_at_non_option: bool,
) -> ParseResult<CommandLine<'a>> {
    ParseEngine::new(model)
        .stop_at_non_option(stop_at_non_option)
        .check_required(false)
        .run(argv)
}
