//! Shell-style variable interpolation for generated names
//!
//! Supported forms:
//! - `$VAR`, `${VAR}` - value, or empty when unset
//! - `${VAR:-default}` - default when unset or empty
//! - `${VAR-default}` - default when unset
//! - `${VAR:?message}` - error when unset or empty
//! - `${VAR?message}` - error when unset
//! - `$$` - a literal `$`
//!
//! Defaults and messages are taken literally, they are not expanded again.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::error::{CoreError, Result};

/// `$$`, `${...}` (closing brace optional so unterminated forms are caught) or `$NAME`
static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(?:(?P<escaped>\$)|\{(?P<body>[^}]*)(?P<close>\})?|(?P<bare>[A-Za-z_][A-Za-z0-9_]*))")
        .unwrap()
});

/// Variable name of a `${...}` body, then whatever operator follows it
static EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?P<op>.*)$").unwrap());

/// Named values available to a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, replacing any previous value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Add a variable only when it is not defined yet
    pub fn set_default(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Expand every variable reference in `template`
    pub fn interpolate(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;

        for caps in REFERENCE.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&template[last..whole.start()]);
            last = whole.end();

            if caps.name("escaped").is_some() {
                out.push('$');
            } else if let Some(name) = caps.name("bare") {
                out.push_str(self.get(name.as_str()).unwrap_or_default());
            } else if let Some(body) = caps.name("body") {
                if caps.name("close").is_none() {
                    return Err(interpolation_error(template, "unterminated '${'"));
                }
                out.push_str(&self.expand(template, body.as_str())?);
            }
        }

        out.push_str(&template[last..]);
        Ok(out)
    }

    /// Expand the body of a `${...}` expression
    fn expand(&self, template: &str, body: &str) -> Result<String> {
        let Some(caps) = EXPRESSION.captures(body) else {
            return Err(interpolation_error(
                template,
                &format!("invalid variable name in '${{{}}}'", body),
            ));
        };
        let name = &caps["name"];
        let op = &caps["op"];

        let value = self.get(name);
        let is_empty = value.is_none_or(str::is_empty);

        if op.is_empty() {
            return Ok(value.unwrap_or_default().to_string());
        }
        if let Some(default) = op.strip_prefix(":-") {
            return Ok(if is_empty { default } else { value.unwrap_or_default() }.to_string());
        }
        if let Some(message) = op.strip_prefix(":?") {
            if is_empty {
                return Err(required_error(template, name, message));
            }
            return Ok(value.unwrap_or_default().to_string());
        }
        if let Some(default) = op.strip_prefix('-') {
            return Ok(value.unwrap_or(default).to_string());
        }
        if let Some(message) = op.strip_prefix('?') {
            return value
                .map(str::to_string)
                .ok_or_else(|| required_error(template, name, message));
        }

        Err(interpolation_error(
            template,
            &format!("unsupported expansion '${{{}}}'", body),
        ))
    }
}

impl<K, V> FromIterator<(K, V)> for Variables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn interpolation_error(template: &str, message: &str) -> CoreError {
    CoreError::Interpolation {
        template: template.to_string(),
        message: message.to_string(),
    }
}

fn required_error(template: &str, name: &str, message: &str) -> CoreError {
    let message = if message.is_empty() {
        format!("variable '{}' is required", name)
    } else {
        format!("{}: {}", name, message)
    };
    interpolation_error(template, &message)
}
