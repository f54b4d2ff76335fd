use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

/// Write the assembled document into `output_dir`, named after the source
/// file with a `.json` extension. Serialization degrades through three
/// tiers: validated pretty-print, textual re-indent, raw buffer. The final
/// filesystem write is always checked.
pub fn write(document: &str, source_path: &Path, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory at {:?}", output_dir))?;
    let destination = output_dir.join(output_file_name(source_path));

    let rendered = match pretty_print(document) {
        Ok(pretty) => pretty,
        Err(err) => {
            log::warn!(
                "assembled document for {:?} is not well-formed JSON: {}",
                source_path,
                err
            );
            match reindent(document) {
                Ok(indented) => indented,
                Err(err) => {
                    log::warn!(
                        "re-indent for {:?} failed, writing raw buffer: {}",
                        source_path,
                        err
                    );
                    document.to_string()
                }
            }
        }
    };

    fs::write(&destination, rendered)
        .with_context(|| format!("failed to write profiles to {:?}", destination))
}

fn output_file_name(source_path: &Path) -> PathBuf {
    let stem = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("profiles");
    PathBuf::from(format!("{}.json", stem))
}

/// Parse as JSON and re-serialize with tab indentation, validating
/// well-formedness along the way.
fn pretty_print(document: &str) -> Result<String> {
    let value: Value = serde_json::from_str(document)?;
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(out)?)
}

/// Non-validating re-indentation: tracks bracket depth outside string
/// literals and normalizes whitespace between tokens. Fails on unterminated
/// strings and unbalanced closers, nothing else.
fn reindent(document: &str) -> Result<String> {
    let mut out = String::with_capacity(document.len());
    let mut depth: usize = 0;
    let mut chars = document.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                out.push('"');
                loop {
                    let Some(c) = chars.next() else {
                        bail!("unterminated string literal");
                    };
                    out.push(c);
                    match c {
                        '\\' => {
                            let Some(escaped) = chars.next() else {
                                bail!("unterminated escape sequence");
                            };
                            out.push(escaped);
                        }
                        '"' => break,
                        _ => {}
                    }
                }
            }
            '{' | '[' => {
                out.push(ch);
                depth += 1;
                newline_indent(&mut out, depth);
            }
            '}' | ']' => {
                let Some(next_depth) = depth.checked_sub(1) else {
                    bail!("unbalanced closing bracket");
                };
                depth = next_depth;
                newline_indent(&mut out, depth);
                out.push(ch);
            }
            ',' => {
                out.push(',');
                newline_indent(&mut out, depth);
            }
            ':' => out.push_str(": "),
            c if c.is_whitespace() => {}
            c => out.push(c),
        }
    }
    if depth != 0 {
        bail!("unbalanced opening bracket");
    }
    Ok(out)
}

fn newline_indent(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push('\t');
    }
}
