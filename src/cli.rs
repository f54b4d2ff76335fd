use std::path::PathBuf;

use clap::Parser;

const DEFAULT_OUTPUT_DIR: &str = "~/Library/Application Support/iTerm2/DynamicProfiles";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Generate dynamic terminal profiles from YAML build configs"
)]
pub struct Cli {
    /// YAML build-config files, or directories scanned recursively for .yaml files
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Directory the generated JSON profile files are written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: String,

    /// Expect-template directories
    // TODO: wire these into generation once expect-script templates land
    #[arg(short, long, value_delimiter = ',')]
    pub expect: Vec<PathBuf>,

    /// Profile template directories, searched in priority order
    #[arg(short, long, value_delimiter = ',')]
    pub profile: Vec<PathBuf>,
}

/// Immutable run configuration derived from the parsed command line.
#[derive(Debug, Clone)]
pub struct Options {
    pub output_dir: PathBuf,
    pub expect_dirs: Vec<PathBuf>,
    pub profile_dirs: Vec<PathBuf>,
}

impl Options {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            output_dir: PathBuf::from(expand_home(&cli.output)),
            expect_dirs: cli.expect.clone(),
            profile_dirs: cli.profile.clone(),
        }
    }
}

/// Expand a leading `~` against the user's home directory.
pub fn expand_home(path: &str) -> String {
    match path.strip_prefix('~') {
        Some(rest) => {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
            format!("{}{}", home.display(), rest)
        }
        None => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_leading_tilde_only() {
        let home = dirs::home_dir().expect("home dir");
        let expanded = expand_home("~/profiles");
        assert_eq!(expanded, format!("{}/profiles", home.display()));
        assert_eq!(expand_home("/etc/~marker"), "/etc/~marker");
    }

    #[test]
    fn options_expand_output_path() {
        let cli = Cli {
            paths: vec![PathBuf::from("build.yaml")],
            output: "~/out".into(),
            expect: Vec::new(),
            profile: vec![PathBuf::from("/tmp/profiles")],
        };
        let options = Options::from_cli(&cli);
        assert!(!options.output_dir.to_string_lossy().starts_with('~'));
        assert_eq!(options.profile_dirs, vec![PathBuf::from("/tmp/profiles")]);
    }
}
