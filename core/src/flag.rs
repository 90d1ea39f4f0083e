//! Flag declarations and value parsing.
//!
//! A [`Flag`] is identified by an optional short form (`-v`) and an optional
//! long form (`--verbose`). Forms are stored without their leading dashes and
//! rendered with them. Values are held as [`serde_json::Value`] so that a
//! command can hold flags of different types side by side and callers can
//! read them back with [`serde`] deserialization.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Error returned by a flag's value parser.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Flag;
///
/// let mut count = Flag::integer("count").long("count");
/// let err = count.update_value("five").unwrap_err();
/// assert_eq!(err.to_string(), "expected an integer, got 'five'");
/// assert!(count.value().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValueParseError {
    message: String,
}

impl ValueParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Converts a raw token into a typed value.
///
/// `Ok(None)` means the parser produced nothing; the flag keeps its value.
pub type ValueParser = Box<dyn Fn(&str) -> Result<Option<Value>, ValueParseError>>;

/// Whether a flag consumes a value token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Presence alone toggles the flag to the negation of its default.
    Switch,
    /// The flag needs a value, inline (`--n=3`, `-n3`) or as the next token.
    Value,
}

/// A declared flag.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Flag, FlagKind};
///
/// let mut verbose = Flag::switch("verbose").short("v").long("verbose");
/// assert_eq!(verbose.kind(), FlagKind::Switch);
/// assert!(verbose.matches("-v"));
/// assert!(verbose.matches("--verbose"));
///
/// verbose.update_value("").unwrap();
/// assert_eq!(verbose.value(), Some(&serde_json::Value::Bool(true)));
/// ```
pub struct Flag {
    name: String,
    short: Option<String>,
    long: Option<String>,
    required: bool,
    kind: FlagKind,
    default: Option<Value>,
    value: Option<Value>,
    usage: String,
    parser: ValueParser,
}

impl Flag {
    /// Creates a value flag with a custom parser.
    pub fn new(
        name: impl Into<String>,
        parser: impl Fn(&str) -> Result<Option<Value>, ValueParseError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            short: None,
            long: None,
            required: false,
            kind: FlagKind::Value,
            default: None,
            value: None,
            usage: String::new(),
            parser: Box::new(parser),
        }
    }

    /// Creates a switch defaulting to `false`.
    pub fn switch(name: impl Into<String>) -> Self {
        Self::switch_with_default(name, false)
    }

    /// Creates a switch whose presence yields `!default`.
    pub fn switch_with_default(name: impl Into<String>, default: bool) -> Self {
        let mut flag = Self::new(name, move |_| Ok(Some(Value::Bool(!default))));
        flag.kind = FlagKind::Switch;
        flag.default = Some(Value::Bool(default));
        flag.value = Some(Value::Bool(default));
        flag
    }

    /// Creates a flag holding the raw string.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, |raw| Ok(Some(Value::String(raw.to_string()))))
    }

    /// Creates a flag holding a signed integer.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, |raw| {
            raw.trim()
                .parse::<i64>()
                .map(|n| Some(Value::from(n)))
                .map_err(|_| ValueParseError::new(format!("expected an integer, got '{raw}'")))
        })
    }

    /// Creates a flag holding a finite floating point number.
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, |raw| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(|n| Some(Value::Number(n)))
                .ok_or_else(|| ValueParseError::new(format!("expected a number, got '{raw}'")))
        })
    }

    /// Creates a flag holding a comma-separated list of strings.
    ///
    /// Empty items are dropped, so `--tags=a,,b` yields `["a", "b"]`.
    pub fn list(name: impl Into<String>) -> Self {
        Self::new(name, |raw| {
            let items = raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect();
            Ok(Some(Value::Array(items)))
        })
    }

    /// Sets the short form, without the leading dash (`"v"`).
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    /// Sets the long form, without the leading dashes (`"verbose"`).
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Sets the default, which is also the starting value.
    ///
    /// Switches keep toggling relative to the default they were created with;
    /// use [`Flag::switch_with_default`] to change it.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default = Some(value.clone());
        self.value = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    /// The raw short identifier, if any.
    pub fn short_id(&self) -> Option<&str> {
        non_empty(&self.short)
    }

    /// The raw long identifier, if any.
    pub fn long_id(&self) -> Option<&str> {
        non_empty(&self.long)
    }

    /// The short form as typed on the command line (`-v`).
    pub fn short_form(&self) -> Option<String> {
        self.short_id().map(|s| format!("-{s}"))
    }

    /// The long form as typed on the command line (`--verbose`).
    pub fn long_form(&self) -> Option<String> {
        self.long_id().map(|l| format!("--{l}"))
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// The current value; `None` means unset.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Runs the parser on `raw` and stores a produced value.
    ///
    /// On error the stored value is left untouched.
    pub fn update_value(&mut self, raw: &str) -> Result<(), ValueParseError> {
        debug!(flag = %self.name, raw, "Updating flag value");
        if let Some(parsed) = (self.parser)(raw)? {
            debug!(flag = %self.name, value = %parsed, "Flag value updated");
            self.value = Some(parsed);
        }
        Ok(())
    }

    /// Returns `true` if `token` is exactly this flag's short or long form.
    pub fn matches(&self, token: &str) -> bool {
        let is_short = self
            .short_id()
            .is_some_and(|s| token.strip_prefix('-') == Some(s));
        let is_long = self
            .long_id()
            .is_some_and(|l| token.strip_prefix("--") == Some(l));
        is_short || is_long
    }

    /// Returns `true` if both flags share a non-empty short or long form.
    ///
    /// A flag without any form never collides with anything.
    pub fn collides_with(&self, other: &Flag) -> bool {
        let short = matches!((self.short_id(), other.short_id()), (Some(a), Some(b)) if a == b);
        let long = matches!((self.long_id(), other.long_id()), (Some(a), Some(b)) if a == b);
        short || long
    }
}

fn non_empty(form: &Option<String>) -> Option<&str> {
    form.as_deref().filter(|s| !s.is_empty())
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity = [self.short_form(), self.long_form(), Some(self.name.clone())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join("\t");
        let marker = if self.required {
            "(required)"
        } else {
            "(optional)"
        };
        write!(f, "{identity}\tUsage: {}\t{marker}", self.usage)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("short", &self.short)
            .field("long", &self.long)
            .field("required", &self.required)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
