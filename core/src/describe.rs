//! Serializable snapshots of a command tree.
//!
//! [`CommandTree::describe`] captures a command and everything below it as
//! plain data; [`format_description`] renders that as JSON, YAML or Markdown.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::command::{CommandId, CommandTree};
use crate::flag::{Flag, FlagKind};

/// Snapshot of one flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    pub kind: FlagKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl From<&Flag> for FlagDescription {
    fn from(flag: &Flag) -> Self {
        Self {
            name: flag.name().to_string(),
            short: flag.short_form(),
            long: flag.long_form(),
            kind: flag.kind(),
            required: flag.is_required(),
            usage: flag.usage_text().to_string(),
            default: flag.default_value().cloned(),
        }
    }
}

/// Snapshot of a command and its subcommands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescription {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(default)]
    pub flags: Vec<FlagDescription>,
    #[serde(default)]
    pub subcommands: Vec<CommandDescription>,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(FormatError::UnknownFormat(other.to_string())),
        }
    }
}

/// Errors raised while rendering a description.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unknown output format: {0} (expected json, yaml or markdown)")]
    UnknownFormat(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CommandTree {
    /// Captures `id` and its subcommands.
    ///
    /// A child that leads back to a command already being described is left
    /// out, so looping trees still produce a finite snapshot.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::{Command, CommandTree, Flag, FlagKind};
    ///
    /// let mut tree = CommandTree::new(Command::new("app", "Demo app", |_| Ok(())));
    /// tree.add_flag(tree.root(), Flag::switch("verbose").long("verbose")).unwrap();
    /// tree.add_subcommand(tree.root(), Command::new("build", "Build it", |_| Ok(())));
    ///
    /// let desc = tree.describe(tree.root());
    /// assert_eq!(desc.flags[0].long.as_deref(), Some("--verbose"));
    /// assert_eq!(desc.flags[0].kind, FlagKind::Switch);
    /// assert_eq!(desc.subcommands[0].name, "build");
    /// ```
    pub fn describe(&self, id: CommandId) -> CommandDescription {
        let mut visiting = HashSet::new();
        self.describe_inner(id, &mut visiting)
    }

    fn describe_inner(&self, id: CommandId, visiting: &mut HashSet<CommandId>) -> CommandDescription {
        visiting.insert(id);
        let command = self.command(id);
        let pending: Vec<CommandId> = command
            .children()
            .iter()
            .copied()
            .filter(|child| !visiting.contains(child))
            .collect();
        let subcommands = pending
            .into_iter()
            .map(|child| self.describe_inner(child, visiting))
            .collect();
        visiting.remove(&id);

        CommandDescription {
            name: command.name().to_string(),
            description: command.description().to_string(),
            long_description: command.long_description().map(String::from),
            flags: command.flags().iter().map(FlagDescription::from).collect(),
            subcommands,
        }
    }
}

/// Renders a description in the requested format.
///
/// # Errors
///
/// Returns [`FormatError`] if serialization fails.
pub fn format_description(
    desc: &CommandDescription,
    format: OutputFormat,
) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(desc)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(desc)?),
        OutputFormat::Markdown => {
            let mut out = String::new();
            description_to_markdown(desc, &[], &mut out);
            Ok(out)
        }
    }
}

fn description_to_markdown(desc: &CommandDescription, parents: &[&str], out: &mut String) {
    let mut path: Vec<&str> = parents.to_vec();
    path.push(&desc.name);
    let level = "#".repeat(path.len().min(6));

    out.push_str(&format!("{level} {}\n\n", path.join(" ")));
    let text = desc.long_description.as_deref().unwrap_or(&desc.description);
    if !text.is_empty() {
        out.push_str(&format!("{text}\n\n"));
    }

    if !desc.flags.is_empty() {
        out.push_str("| Flag | Name | Kind | Required | Usage |\n");
        out.push_str("|------|------|------|----------|-------|\n");
        for flag in &desc.flags {
            let forms = match (&flag.short, &flag.long) {
                (Some(s), Some(l)) => format!("`{s}`, `{l}`"),
                (Some(s), None) => format!("`{s}`"),
                (None, Some(l)) => format!("`{l}`"),
                (None, None) => "?".to_string(),
            };
            let kind = match flag.kind {
                FlagKind::Switch => "switch",
                FlagKind::Value => "value",
            };
            let required = if flag.required { "yes" } else { "no" };
            out.push_str(&format!(
                "| {forms} | {} | {kind} | {required} | {} |\n",
                flag.name, flag.usage
            ));
        }
        out.push('\n');
    }

    if !desc.subcommands.is_empty() {
        out.push_str("| Command | Description |\n");
        out.push_str("|---------|-------------|\n");
        for sub in &desc.subcommands {
            out.push_str(&format!("| `{}` | {} |\n", sub.name, sub.description));
        }
        out.push('\n');
    }

    for sub in &desc.subcommands {
        description_to_markdown(sub, &path, out);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Command;

    fn sample_tree() -> CommandTree {
        let mut tree = CommandTree::new(Command::new("app", "Demo app", |_| Ok(())));
        let root = tree.root();
        tree.add_flag(root, Flag::switch("verbose").short("v").long("verbose"))
            .unwrap();
        let build = tree.add_subcommand(root, Command::new("build", "Build it", |_| Ok(())));
        tree.add_flag(
            build,
            Flag::integer("jobs")
                .short("j")
                .long("jobs")
                .usage("parallel jobs")
                .with_default(1),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_json_output_skips_empty_fields() {
        let tree = sample_tree();
        let json = format_description(&tree.describe(tree.root()), OutputFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["name"], json!("app"));
        assert_eq!(value["flags"][0]["kind"], json!("switch"));
        assert!(value["flags"][0].get("usage").is_none());
        assert_eq!(value["subcommands"][0]["flags"][0]["default"], json!(1));
    }

    #[test]
    fn test_yaml_output_reads_back() {
        let tree = sample_tree();
        let desc = tree.describe(tree.root());
        let yaml = format_description(&desc, OutputFormat::Yaml).unwrap();

        let back: CommandDescription = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn test_markdown_nests_subcommands() {
        let tree = sample_tree();
        let md = format_description(&tree.describe(tree.root()), OutputFormat::Markdown).unwrap();

        assert!(md.starts_with("# app\n\nDemo app\n\n"));
        assert!(md.contains("| `-v`, `--verbose` | verbose | switch | no |  |\n"));
        assert!(md.contains("| `build` | Build it |\n"));
        assert!(md.contains("## app build\n"));
        assert!(md.contains("| `-j`, `--jobs` | jobs | value | no | parallel jobs |\n"));
    }

    #[test]
    fn test_format_names() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!(matches!(
            "toml".parse::<OutputFormat>(),
            Err(FormatError::UnknownFormat(_))
        ));
    }
}
