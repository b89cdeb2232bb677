//! Output path templates.
//!
//! A template such as `{{.Dir}}_{{.OS}}_{{.Arch}}` names each binary.
//! `Dir` is the last element of the package path, `OS` and `Arch` come
//! from the target platform.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::platform::Platform;

/// The template used when none is configured.
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "{{.Dir}}_{{.OS}}_{{.Arch}}";

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*\.(\w+)\s*\}\}").unwrap());

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct TemplateError {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Dir,
    Os,
    Arch,
}

/// A parsed output path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    raw: String,
    parts: Vec<Part>,
}

impl OutputTemplate {
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        if raw.trim().is_empty() {
            return Err(TemplateError {
                reason: "template is empty".to_string(),
            });
        }

        let mut parts = Vec::new();
        let mut last = 0;

        for caps in VARIABLE_RE.captures_iter(raw) {
            let Some(whole) = caps.get(0) else { continue };
            push_literal(&mut parts, &raw[last..whole.start()])?;

            let part = match &caps[1] {
                "Dir" => Part::Dir,
                "OS" => Part::Os,
                "Arch" => Part::Arch,
                other => {
                    return Err(TemplateError {
                        reason: format!(
                            "unknown variable `.{}`; expected `.Dir`, `.OS` or `.Arch`",
                            other
                        ),
                    })
                }
            };
            parts.push(part);
            last = whole.end();
        }
        push_literal(&mut parts, &raw[last..])?;

        Ok(OutputTemplate {
            raw: raw.to_string(),
            parts,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn render(&self, dir: &str, os: &str, arch: &str) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(s) => out.push_str(s),
                Part::Dir => out.push_str(dir),
                Part::Os => out.push_str(os),
                Part::Arch => out.push_str(arch),
            }
        }
        out
    }

    /// Output path for one package and platform, with `.exe` added for
    /// Windows targets. Relative templates stay relative.
    pub fn output_path(&self, package_path: &str, platform: &Platform) -> PathBuf {
        let mut rendered = self.render(
            package_basename(package_path),
            &platform.os,
            &platform.arch,
        );
        if platform.needs_exe_suffix() {
            rendered.push_str(".exe");
        }
        PathBuf::from(rendered)
    }
}

fn push_literal(parts: &mut Vec<Part>, literal: &str) -> Result<(), TemplateError> {
    if literal.contains("{{") || literal.contains("}}") {
        return Err(TemplateError {
            reason: format!("malformed action in `{}`", literal),
        });
    }
    if !literal.is_empty() {
        parts.push(Part::Literal(literal.to_string()));
    }
    Ok(())
}

/// Last element of a slash separated package path.
pub fn package_basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return ".";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
