//! Secret references in configuration values.
//!
//! `pass::entry` reads the first line of `pass show entry`, `env::NAME`
//! reads an environment variable, and any other value is taken literally.

use std::process::Command;

/// Where a configured value comes from.
#[derive(Debug, PartialEq, Eq)]
pub enum SecretRef<'a> {
    /// An entry in the `pass` password store.
    Pass(&'a str),
    /// An environment variable.
    Env(&'a str),
    /// The value itself.
    Literal(&'a str),
}

impl<'a> SecretRef<'a> {
    /// Classifies `value` by its prefix.
    pub fn parse(value: &'a str) -> Self {
        if let Some(entry) = value.strip_prefix("pass::") {
            Self::Pass(entry)
        } else if let Some(name) = value.strip_prefix("env::") {
            Self::Env(name)
        } else {
            Self::Literal(value)
        }
    }

    /// Produces the secret.
    pub fn resolve(&self) -> Result<String, String> {
        match *self {
            Self::Pass(entry) => from_pass(entry),
            Self::Env(name) => {
                std::env::var(name).map_err(|_| format!("environment variable `{}` is not set", name))
            }
            Self::Literal(value) => Ok(value.to_string()),
        }
    }
}

/// Resolves a value that may be a secret reference.
pub fn resolve(value: &str) -> Result<String, String> {
    SecretRef::parse(value).resolve()
}

fn from_pass(entry: &str) -> Result<String, String> {
    let output = Command::new("pass")
        .args(["show", entry])
        .output()
        .map_err(|e| format!("cannot run `pass show {}`: {}", entry, e))?;

    if !output.status.success() {
        return Err(format!(
            "`pass show {}` exited with {}: {}",
            entry,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    match stdout.lines().next() {
        Some(first) => Ok(first.to_string()),
        None => Err(format!("`pass show {}` printed nothing", entry)),
    }
}
