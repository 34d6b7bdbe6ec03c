use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::cli::args::CliArgs;
use sable_checker::{CheckerOptions, LanguageMode, StrictConcurrency};

pub const CONFIG_FILE_NAME: &str = "sable.json";

/// Accepts `true` as well as `"true"` for boolean options.
fn deserialize_bool_or_string<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match Option::<BoolOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(BoolOrString::Bool(b)) => Ok(Some(b)),
        Some(BoolOrString::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(Error::custom(format!(
                "invalid boolean value: '{s}'. Expected true, false, 'true', or 'false'"
            ))),
        },
    }
}

/// `languageMode` may be written as `6` or `"6"`.
fn deserialize_number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    Ok(
        Option::<NumberOrString>::deserialize(deserializer)?.map(|value| match value {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::String(s) => s,
        }),
    )
}

/// Contents of `sable.json`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SableConfig {
    #[serde(default)]
    pub checker_options: Option<ConfigCheckerOptions>,
    /// Fixtures to check when none are given on the command line, relative
    /// to the config file.
    #[serde(default)]
    pub files: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConfigCheckerOptions {
    #[serde(default)]
    pub strict_concurrency: Option<String>,
    #[serde(default, deserialize_with = "deserialize_number_or_string")]
    pub language_mode: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bool_or_string")]
    pub infer_sendable_from_captures: Option<bool>,
}

pub fn parse_config(source: &str) -> Result<SableConfig> {
    serde_json::from_str(source).context("failed to parse sable.json")
}

pub fn load_config(path: &Path) -> Result<SableConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&source).with_context(|| format!("invalid config: {}", path.display()))
}

/// Find the config file: `--project` (a file or a directory), otherwise
/// `sable.json` in `cwd` if present.
pub fn resolve_config_path(cwd: &Path, project: Option<&Path>) -> Result<Option<PathBuf>> {
    let Some(project) = project else {
        let candidate = cwd.join(CONFIG_FILE_NAME);
        return Ok(candidate.is_file().then_some(candidate));
    };
    let project = if project.is_absolute() {
        project.to_path_buf()
    } else {
        cwd.join(project)
    };
    let path = if project.is_dir() {
        project.join(CONFIG_FILE_NAME)
    } else {
        project
    };
    if !path.is_file() {
        bail!("config file not found: {}", path.display());
    }
    Ok(Some(path))
}

pub fn resolve_checker_options(options: Option<&ConfigCheckerOptions>) -> Result<CheckerOptions> {
    let mut resolved = CheckerOptions::default();
    let Some(options) = options else {
        return Ok(resolved);
    };

    if let Some(value) = options.strict_concurrency.as_deref() {
        resolved.strict_concurrency = StrictConcurrency::parse(value.trim())
            .with_context(|| format!("invalid strictConcurrency: '{value}'"))?;
    }
    if let Some(value) = options.language_mode.as_deref() {
        resolved.language_mode = LanguageMode::parse(value.trim())
            .with_context(|| format!("invalid languageMode: '{value}'"))?;
    }
    if let Some(infer) = options.infer_sendable_from_captures {
        resolved.infer_sendable_from_captures = infer;
    }
    Ok(resolved)
}

/// Command line flags win over the config file.
pub fn apply_cli_overrides(options: &mut CheckerOptions, args: &CliArgs) {
    if let Some(strict) = args.strict_concurrency {
        options.strict_concurrency = strict.into();
    }
    if let Some(mode) = args.language_mode {
        options.language_mode = mode.into();
    }
    if let Some(infer) = args.infer_sendable_from_captures {
        options.infer_sendable_from_captures = infer;
    }
}
