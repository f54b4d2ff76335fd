use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;

use crate::cli::Options;
use crate::output;
use crate::template;

/// One parsed YAML build-config file: shared defaults plus per-service
/// overrides, one generated profile per service entry.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BuildConfig {
    pub basic: BTreeMap<String, String>,
    pub services: Vec<BTreeMap<String, String>>,
}

// Matches `${key}` and `$key` placeholder tokens. Keys are maximal
// identifier runs, so a `user` key can never clip a `$username` token.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z0-9_]+)\}|([A-Za-z0-9_]+))").expect("valid placeholder pattern")
});

/// Read one build config, assemble the profiles document, and write it to
/// the output directory. Unreadable or unparseable input is an error.
pub fn generate(config_path: &Path, options: &Options) -> Result<()> {
    let raw = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read build config at {:?}", config_path))?;
    let config: BuildConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse build config at {:?}", config_path))?;
    let document = assemble(&config, options)?;
    output::write(&document, config_path, &options.output_dir)
}

/// Merge and substitute every service entry into the resolved template and
/// wrap the fragments as a `{"Profiles": [...]}` document.
pub fn assemble(config: &BuildConfig, options: &Options) -> Result<String> {
    let profile_name = config
        .basic
        .get("profile")
        .map(String::as_str)
        .unwrap_or(template::DEFAULT_PROFILE);
    let template_text = template::resolve(profile_name, &options.profile_dirs)?;

    let mut fragments = Vec::new();
    for (k, overrides) in config.services.iter().enumerate() {
        // $index stays tied to the position in Services even when earlier
        // entries were skipped
        let Some(settings) = effective_settings(&config.basic, overrides) else {
            continue;
        };
        fragments.push(substitute(&template_text, &settings, k + 1));
    }
    Ok(format!(
        "{{\n\t\"Profiles\": [{}]\n}}",
        fragments.join(",\n\t")
    ))
}

/// Overlay a service entry on the shared defaults and inject the derived
/// keys. Returns `None` (entry skipped) when no `name` survives the merge.
fn effective_settings(
    basic: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> Option<BTreeMap<String, String>> {
    let mut settings = basic.clone();
    for (key, value) in overrides {
        settings.insert(key.clone(), value.clone());
    }
    let Some(name) = settings.get("name").cloned() else {
        log::warn!("ignoring service entry without a name: {:?}", settings);
        return None;
    };
    settings.insert("guid".into(), STANDARD_NO_PAD.encode(name.as_bytes()));
    settings
        .entry("badge_text".into())
        .or_insert_with(|| name.clone());
    settings.entry("tab_text".into()).or_insert(name);
    Some(settings)
}

/// Replace placeholder tokens in one pass. Settings values win over the
/// built-in `index`; tokens naming neither stay verbatim. Values are escaped
/// so quotes, backslashes and control characters cannot break the JSON
/// around them.
fn substitute(template: &str, settings: &BTreeMap<String, String>, index: usize) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let key = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if let Some(value) = settings.get(key) {
                escape_json_value(value)
            } else if key == "index" {
                index.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn escape_json_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(escaped, "\\u{:04x}", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped
}
