use std::fs;
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::cli::expand_home;

pub const DEFAULT_PROFILE: &str = "ssh.json";

// Default templates compiled into the binary, keyed by the name they are
// requested under.
const BUNDLED: &[(&str, &str)] = &[
    ("ssh.json", include_str!("../profiles/ssh.json")),
    ("command.json", include_str!("../profiles/command.json")),
];

/// Locate the template text for `name`: user directories first (in the given
/// order), then the bundled set. A candidate directory that exists but cannot
/// supply the file is logged and skipped; an unresolvable name is an error.
pub fn resolve(name: &str, profile_dirs: &[PathBuf]) -> Result<String> {
    let name = expand_home(name);
    for dir in profile_dirs {
        if !dir.is_dir() {
            continue;
        }
        match fs::read_to_string(dir.join(&name)) {
            Ok(content) => return Ok(content),
            Err(err) => {
                log::warn!("failed to read profile {:?} from {:?}: {}", name, dir, err);
            }
        }
    }
    if let Some((_, content)) = BUNDLED.iter().find(|(bundled, _)| *bundled == name) {
        return Ok((*content).to_string());
    }
    log::warn!("profile {:?} not found in bundled templates", name);
    bail!("can't find profile {:?}", name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_directory_with_the_file_wins() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        fs::write(first.path().join("custom.json"), "from-first").unwrap();
        fs::write(second.path().join("custom.json"), "from-second").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let content = resolve("custom.json", &dirs).expect("resolve");
        assert_eq!(content, "from-first");
    }

    #[test]
    fn missing_file_falls_through_to_next_directory() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        fs::write(second.path().join("custom.json"), "from-second").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let content = resolve("custom.json", &dirs).expect("resolve");
        assert_eq!(content, "from-second");
    }

    #[test]
    fn nonexistent_directory_is_skipped() {
        let real = tempfile::tempdir().expect("tempdir");
        fs::write(real.path().join("custom.json"), "found").unwrap();

        let dirs = vec![
            real.path().join("does-not-exist"),
            real.path().to_path_buf(),
        ];
        assert_eq!(resolve("custom.json", &dirs).expect("resolve"), "found");
    }

    #[test]
    fn bundled_templates_back_the_user_directories() {
        let empty = tempfile::tempdir().expect("tempdir");
        let content =
            resolve(DEFAULT_PROFILE, &[empty.path().to_path_buf()]).expect("resolve");
        assert!(content.contains("$guid"));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        assert!(resolve("no-such-template.json", &[]).is_err());
    }
}
