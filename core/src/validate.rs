//! Command tree validation.
//!
//! Catches trees that build fine but cannot be driven from the command line
//! as declared: flag forms the token grammar can never produce, flags with
//! no form at all, sibling commands sharing a name, and parent loops.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::*;
//!
//! let mut tree = CommandTree::new(Command::new("app", "demo", |_| Ok(())));
//! tree.add_flag(tree.root(), Flag::switch("verbose").short("v").long("verbose")).unwrap();
//! assert!(validate_tree(&tree).is_empty());
//!
//! // `--dry-run` is split by the token grammar into `--dry` and `-run`.
//! tree.add_flag(tree.root(), Flag::switch("dry").long("dry-run")).unwrap();
//! assert_eq!(
//!     validate_tree(&tree),
//!     vec![ValidationError::InvalidLongFlag("app".into(), "dry-run".into())]
//! );
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::command::{CommandId, CommandTree};
use crate::flag::Flag;

static SHORT_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_]$").expect("static regex must compile"));
static LONG_FORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_]{2,}$").expect("static regex must compile"));

/// Structural problems in a command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A command name is empty or whitespace-only.
    #[error("command name cannot be empty (under {0})")]
    EmptyCommandName(String),
    /// A short form is not exactly one ASCII word character.
    #[error("invalid short flag format on {0}: {1}")]
    InvalidShortFlag(String, String),
    /// A long form is shorter than two characters or contains non-ASCII-word characters.
    #[error("invalid long flag format on {0}: {1}")]
    InvalidLongFlag(String, String),
    /// A flag has neither short nor long form and cannot be set from argv.
    #[error("flag {1} on {0} must define a short or long form")]
    MissingFlagForm(String, String),
    /// Two children of the same command share a name.
    #[error("duplicate subcommand in {0}: {1}")]
    DuplicateSubcommand(String, String),
    /// Following children leads back to a command already on the path.
    #[error("subcommand cycle detected at path: {0}")]
    SubcommandCycle(String),
}

/// Validates every command reachable from the root.
///
/// Stops at the first problem found, walking depth first.
pub fn validate_tree(tree: &CommandTree) -> Vec<ValidationError> {
    let mut path = Vec::new();
    validate_command(tree, tree.root(), &mut path)
}

fn validate_command(
    tree: &CommandTree,
    id: CommandId,
    path: &mut Vec<CommandId>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let command = tree.command(id);

    if path.contains(&id) {
        let cycle_path = path
            .iter()
            .chain(std::iter::once(&id))
            .map(|&c| tree.command(c).name())
            .collect::<Vec<_>>()
            .join(" ");
        errors.push(ValidationError::SubcommandCycle(cycle_path));
        return errors;
    }

    let display = display_path(tree, path, id);
    if command.name().trim().is_empty() {
        let parent = path
            .last()
            .map(|&p| tree.command(p).name().to_string())
            .unwrap_or_else(|| "<root>".to_string());
        errors.push(ValidationError::EmptyCommandName(parent));
        return errors;
    }

    errors.extend(validate_flags(&display, command.flags()));
    if !errors.is_empty() {
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for &child in command.children() {
        let name = tree.command(child).name();
        if !name.trim().is_empty() && !seen.insert(name) {
            errors.push(ValidationError::DuplicateSubcommand(
                display.clone(),
                name.to_string(),
            ));
            return errors;
        }
    }

    path.push(id);
    for &child in command.children() {
        errors.extend(validate_command(tree, child, path));
        if !errors.is_empty() {
            break;
        }
    }
    path.pop();

    errors
}

fn validate_flags(command: &str, flags: &[Flag]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for flag in flags {
        if flag.short_id().is_none() && flag.long_id().is_none() {
            errors.push(ValidationError::MissingFlagForm(
                command.to_string(),
                flag.name().to_string(),
            ));
            return errors;
        }

        if let Some(short) = flag.short_id() {
            if !SHORT_FORM.is_match(short) {
                errors.push(ValidationError::InvalidShortFlag(
                    command.to_string(),
                    short.to_string(),
                ));
                return errors;
            }
        }

        if let Some(long) = flag.long_id() {
            if !LONG_FORM.is_match(long) {
                errors.push(ValidationError::InvalidLongFlag(
                    command.to_string(),
                    long.to_string(),
                ));
                return errors;
            }
        }
    }

    errors
}

fn display_path(tree: &CommandTree, path: &[CommandId], id: CommandId) -> String {
    path.iter()
        .chain(std::iter::once(&id))
        .map(|&c| tree.command(c).name())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Command;

    fn noop(name: &str) -> Command {
        Command::new(name, "", |_| Ok(()))
    }

    #[test]
    fn test_valid_tree_passes() {
        let mut tree = CommandTree::new(noop("git"));
        let remote = tree.add_subcommand(tree.root(), noop("remote"));
        tree.add_subcommand(remote, noop("add"));
        tree.add_flag(remote, Flag::switch("verbose").short("v").long("verbose"))
            .unwrap();

        assert!(validate_tree(&tree).is_empty());
    }

    #[test]
    fn test_rejects_dashed_short_form() {
        let mut tree = CommandTree::new(noop("git"));
        tree.add_flag(tree.root(), Flag::switch("verbose").short("-v"))
            .unwrap();

        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::InvalidShortFlag(
                "git".to_string(),
                "-v".to_string()
            )]
        );
    }

    #[test]
    fn test_rejects_one_letter_long_form() {
        let mut tree = CommandTree::new(noop("git"));
        let commit = tree.add_subcommand(tree.root(), noop("commit"));
        tree.add_flag(commit, Flag::text("m").long("m")).unwrap();

        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::InvalidLongFlag(
                "git commit".to_string(),
                "m".to_string()
            )]
        );
    }

    #[test]
    fn test_reports_anonymous_flag() {
        let mut tree = CommandTree::new(noop("git"));
        tree.add_flag(tree.root(), Flag::text("ghost")).unwrap();
        tree.add_flag(tree.root(), Flag::text("phantom")).unwrap();

        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::MissingFlagForm(
                "git".to_string(),
                "ghost".to_string()
            )]
        );
    }

    #[test]
    fn test_rejects_non_ascii_forms() {
        let mut tree = CommandTree::new(noop("git"));
        tree.add_flag(tree.root(), Flag::switch("accent").short("é"))
            .unwrap();

        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::InvalidShortFlag(
                "git".to_string(),
                "é".to_string()
            )]
        );
    }

    #[test]
    fn test_rejects_duplicate_siblings() {
        let mut tree = CommandTree::new(noop("git"));
        tree.add_subcommand(tree.root(), noop("push"));
        tree.add_subcommand(tree.root(), noop("push"));

        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::DuplicateSubcommand(
                "git".to_string(),
                "push".to_string()
            )]
        );
    }

    #[test]
    fn test_rejects_subcommand_cycle() {
        let mut tree = CommandTree::new(noop("git"));
        let remote = tree.add_subcommand(tree.root(), noop("remote"));
        tree.attach(remote, tree.root());

        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::SubcommandCycle(
                "git remote git".to_string()
            )]
        );
    }

    #[test]
    fn test_rejects_empty_child_name() {
        let mut tree = CommandTree::new(noop("git"));
        tree.add_subcommand(tree.root(), noop("  "));

        assert_eq!(
            validate_tree(&tree),
            vec![ValidationError::EmptyCommandName("git".to_string())]
        );
    }
}
