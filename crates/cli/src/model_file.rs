use anyhow::{Context, Result, bail};
use argkit::{Arity, OptionModel, OptionSpec};
use argkit_schema::{GroupDef, ModelDef, OptionDef};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_NAME: &str = "argkit.json";

#[derive(Debug)]
pub struct LoadedModel {
    pub path: PathBuf,
    pub def: ModelDef,
    pub model: OptionModel,
}

/// Read and build the model at `model_path`, or `argkit.json` in the current
/// directory when no path is given.
pub fn load_model(model_path: Option<&Path>) -> Result<LoadedModel> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let (path, explicit) = match model_path {
        Some(p) => (cwd.join(p), true),
        None => (cwd.join(DEFAULT_MODEL_NAME), false),
    };

    if !path.exists() {
        if explicit {
            bail!("model not found: {}", path.display());
        }
        bail!(
            "no {DEFAULT_MODEL_NAME} in {}; run `argkit init` or pass --model",
            cwd.display()
        );
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read model: {}", path.display()))?;
    let def = ModelDef::from_json_str(&contents)
        .with_context(|| format!("failed to load model: {}", path.display()))?;
    let model = def
        .build()
        .with_context(|| format!("invalid option model: {}", path.display()))?;
    tracing::debug!(path = %path.display(), options = model.len(), "loaded model");

    Ok(LoadedModel { path, def, model })
}

/// Write a sample model into `project_dir`. Refuses to overwrite.
pub fn write_default_model(project_dir: &Path, name: Option<&str>) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_MODEL_NAME);
    if dest.exists() {
        bail!("{DEFAULT_MODEL_NAME} already exists in {}", project_dir.display());
    }

    let name = match name {
        Some(n) => n.to_string(),
        None => model_name_for(project_dir).unwrap_or_else(|| "my-cli".to_string()),
    };

    let mut out = sample_model(&name)
        .to_json_pretty()
        .context("failed to serialize model")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

/// Arguments of a preset file: one per line, blank lines and `#` comments skipped.
pub fn read_preset(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read preset: {}", path.display()))?;
    Ok(contents
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn sample_model(name: &str) -> ModelDef {
    let option = |spec: OptionSpec| OptionDef::from_spec(&spec);

    let mut def = ModelDef::new(name);
    def.options = vec![
        option(OptionSpec::short('v').long("verbose").description("Verbose output")),
        option(
            OptionSpec::short('o')
                .long("output")
                .takes_value()
                .default_values(["out.txt"])
                .description("Output file"),
        ),
        option(
            OptionSpec::short('D')
                .arity(Arity::optional_fixed(2))
                .value_separator('=')
                .description("Define a property (key=value)"),
        ),
    ];
    def.groups = vec![GroupDef {
        required: false,
        options: vec![
            option(OptionSpec::long_only("fast").description("Favor speed")),
            option(OptionSpec::long_only("small").description("Favor size")),
        ],
    }];
    def
}

/// Name of the directory the model lives in, with `.` and `..` resolved.
fn model_name_for(project_dir: &Path) -> Option<String> {
    let dir = fs::canonicalize(project_dir).ok()?;
    dir.file_name()?.to_str().map(str::to_string)
}
