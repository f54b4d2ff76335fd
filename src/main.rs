mod build;
mod cli;
mod discover;
mod output;
mod template;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::init();

    let cli = cli::Cli::parse();
    let options = cli::Options::from_cli(&cli);
    if !options.expect_dirs.is_empty() {
        log::debug!("expect template dirs: {:?}", options.expect_dirs);
    }

    for path in &cli.paths {
        if path.is_dir() {
            let scan = discover::scan(path, ".yaml")?;
            for error in &scan.errors {
                log::warn!("skipping unreadable entry: {}", error);
            }
            for file in &scan.files {
                build::generate(file, &options)?;
            }
        } else {
            build::generate(path, &options)?;
        }
    }
    Ok(())
}
