//! Argument vector resolution.
//!
//! One pass per command level, in this order:
//!
//! 1. the root checks the executable name, a child drops everything up to
//!    and including its own name;
//! 2. `help`, `--help` or `-h` as the first token renders the help page;
//! 3. the first `--` splits off the passthrough segment;
//! 4. at most one child named in the remaining tokens is selected and the
//!    tokens from its name onwards are deferred to it;
//! 5. flag tokens are matched and their values consumed;
//! 6. required flags are checked;
//! 7. `pre_run`, `run`, the selected child and `post_run` are dispatched.
//!
//! Every token is looked at once. A token consumed as a flag or a flag value
//! is never reconsidered.

use std::io::Write;
use std::env::consts::EXE_SUFFIX;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::command::{CommandId, CommandTree};
use crate::console::Console;
use crate::error::{ResolveError, Result, UsageError};
use crate::flag::FlagKind;
use crate::invocation::{FlagValues, Invocation};

/// `-x` or `--xx...`, optionally followed by `=value` or a glued value.
/// Identifiers are ASCII word characters only.
static FLAG_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-[0-9A-Za-z_]|--[0-9A-Za-z_]{2,})(=?(.+))?").expect("static regex must compile")
});

/// Tokens that cannot serve as a flag value.
static FLAG_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-[0-9A-Za-z_]|--[0-9A-Za-z_]{2})").expect("static regex must compile")
});

const HELP_TOKENS: [&str; 3] = ["help", "--help", "-h"];
const SEPARATOR: &str = "--";

/// How a resolution pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Callbacks ran for every command in `dispatched`, root first.
    Completed { dispatched: Vec<CommandId> },
    /// A help shortcut was found at `command`; nothing ran.
    Help { command: CommandId, page: String },
}

enum Hook {
    PreRun,
    PostRun,
}

impl CommandTree {
    /// Resolves `argv` and runs the callbacks, reporting to stdout/stderr.
    ///
    /// `argv[0]` is the path of the invoking executable. Returns the process
    /// exit code: `0` on success or help, `1` on any usage error.
    pub fn execute<I, S>(&mut self, argv: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute_with(argv, &mut Console::stdio())
    }

    /// [`execute`](Self::execute) with explicit output streams.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::{Command, CommandTree, Console};
    ///
    /// let mut tree = CommandTree::new(Command::new("app", "Demo app", |_| Ok(())));
    /// let mut console = Console::new(Vec::new(), Vec::new());
    ///
    /// assert_eq!(tree.execute_with(["/usr/bin/app", "--help"], &mut console), 0);
    /// assert_eq!(tree.execute_with(["/usr/bin/other"], &mut console), 1);
    ///
    /// let (out, err) = console.into_parts();
    /// assert_eq!(String::from_utf8(out).unwrap(), "Usage: app\nDemo app\n");
    /// assert_eq!(
    ///     String::from_utf8(err).unwrap(),
    ///     "ERROR: root command name app does not match with executable name: other\n"
    /// );
    /// ```
    pub fn execute_with<I, S, O, E>(&mut self, argv: I, console: &mut Console<O, E>) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        O: Write,
        E: Write,
    {
        match self.resolve_with(argv, console) {
            Ok(Outcome::Completed { dispatched }) => {
                debug!(commands = dispatched.len(), "Resolution completed");
                0
            }
            Ok(Outcome::Help { command, page }) => {
                debug!(command = %self.command(command).name(), "Showing help page");
                report(console.write_raw(&page));
                0
            }
            Err(err) => {
                report(console.error(&err));
                if err.error.shows_help() {
                    report(console.write_raw(&self.help_page(err.command)));
                }
                1
            }
        }
    }

    /// Resolves `argv` and runs the callbacks without printing anything.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] naming the command whose pass failed.
    pub fn resolve<I, S>(&mut self, argv: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut console = Console::new(std::io::sink(), std::io::sink());
        self.resolve_with(argv, &mut console)
    }

    /// Resolves `argv`, writing `pre_run`/`post_run` failures to `console`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] naming the command whose pass failed.
    pub fn resolve_with<I, S, O, E>(&mut self, argv: I, console: &mut Console<O, E>) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        O: Write,
        E: Write,
    {
        let root = self.root();
        let mut argv = argv.into_iter().map(Into::into);
        let program = argv
            .next()
            .ok_or_else(|| ResolveError::new(root, UsageError::EmptyArgv))?;

        if self.settings().check_executable_name {
            let found = executable_name(&program);
            let expected = self.command(root).name();
            if found != expected {
                return Err(ResolveError::new(
                    root,
                    UsageError::ExecutableMismatch {
                        expected: expected.to_string(),
                        found,
                    },
                ));
            }
        }

        let mut dispatched = Vec::new();
        self.resolve_level(root, argv.collect(), None, console, &mut dispatched)
    }

    /// One command level. `inherited` is `None` at the root and carries the
    /// ancestors' passthrough segment otherwise.
    fn resolve_level<O: Write, E: Write>(
        &mut self,
        id: CommandId,
        mut args: Vec<String>,
        inherited: Option<Vec<String>>,
        console: &mut Console<O, E>,
        dispatched: &mut Vec<CommandId>,
    ) -> Result<Outcome> {
        let name = self.command(id).name().to_string();

        if inherited.is_some() {
            if let Some(pos) = args.iter().position(|arg| *arg == name) {
                args = args.split_off(pos + 1);
            }
        }

        if args
            .first()
            .is_some_and(|first| HELP_TOKENS.contains(&first.to_lowercase().as_str()))
        {
            return Ok(Outcome::Help {
                command: id,
                page: self.help_page(id),
            });
        }

        let passthrough: Vec<String> = match args.iter().position(|arg| arg == SEPARATOR) {
            Some(pos) => args.split_off(pos).into_iter().skip(1).collect(),
            None => inherited.unwrap_or_default(),
        };

        let selected = self.select_subcommand(id, &mut args)?;
        debug!(command = %name, args = ?args, "Scanning flags");

        let positional = self.scan_flags(id, args)?;

        let missing: Vec<String> = self
            .command(id)
            .flags()
            .iter()
            .filter(|flag| flag.is_required() && flag.value().is_none())
            .map(|flag| flag.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ResolveError::new(id, UsageError::MissingRequired(missing)));
        }

        let flags: FlagValues = self
            .command(id)
            .flags()
            .iter()
            .filter_map(|flag| {
                flag.value()
                    .map(|value| (flag.name().to_string(), value.clone()))
            })
            .collect();
        debug!(command = %name, present = flags.len(), "Dispatching");

        let invocation = Invocation {
            command: name.clone(),
            args: positional,
            flags,
            passthrough: passthrough.clone(),
        };

        self.run_hook(id, Hook::PreRun, &invocation, console);
        (self.command_mut(id).run)(&invocation).map_err(|source| {
            ResolveError::new(
                id,
                UsageError::RunFailed {
                    command: name.clone(),
                    source,
                },
            )
        })?;
        dispatched.push(id);

        if let Some((child, tail)) = selected {
            if let help @ Outcome::Help { .. } =
                self.resolve_level(child, tail, Some(passthrough), console, dispatched)?
            {
                return Ok(help);
            }
        }

        self.run_hook(id, Hook::PostRun, &invocation, console);

        Ok(Outcome::Completed {
            dispatched: dispatched.clone(),
        })
    }

    /// Picks the single child named in `args` and splits its tail off.
    fn select_subcommand(
        &self,
        id: CommandId,
        args: &mut Vec<String>,
    ) -> Result<Option<(CommandId, Vec<String>)>> {
        let present: Vec<CommandId> = self
            .command(id)
            .children()
            .iter()
            .copied()
            .filter(|&child| {
                let child_name = self.command(child).name();
                args.iter().any(|arg| arg == child_name)
            })
            .collect();

        match present.as_slice() {
            [] => Ok(None),
            [child] => {
                let child_name = self.command(*child).name();
                debug!(command = %self.command(id).name(), subcommand = %child_name, "Selected subcommand");
                let pos = args
                    .iter()
                    .position(|arg| arg == child_name)
                    .unwrap_or(args.len());
                Ok(Some((*child, args.split_off(pos))))
            }
            _ => Err(ResolveError::new(
                id,
                UsageError::AmbiguousSubcommand {
                    found: present
                        .iter()
                        .map(|&child| self.command(child).name().to_string())
                        .collect(),
                },
            )),
        }
    }

    /// Applies flag tokens and returns what is left as positional arguments.
    fn scan_flags(&mut self, id: CommandId, args: Vec<String>) -> Result<Vec<String>> {
        let strict = self.settings().strict_values;
        let flags = self.command_mut(id).flags_mut();
        let mut positional = Vec::with_capacity(args.len());
        let mut tokens = args.into_iter().peekable();

        while let Some(token) = tokens.next() {
            let Some(caps) = FLAG_TOKEN.captures(&token) else {
                positional.push(token);
                continue;
            };
            let ident = caps.get(1).map_or("", |m| m.as_str()).to_string();
            let inline = caps.get(3).map(|m| m.as_str().to_string());

            let matched: Vec<usize> = flags
                .iter()
                .enumerate()
                .filter(|(_, flag)| flag.matches(&ident))
                .map(|(index, _)| index)
                .collect();
            let index = match matched.as_slice() {
                [] => {
                    positional.push(token);
                    continue;
                }
                [index] => *index,
                _ => {
                    return Err(ResolveError::new(
                        id,
                        UsageError::AmbiguousFlag {
                            token: ident,
                            matched: matched
                                .iter()
                                .map(|&i| flags[i].name().to_string())
                                .collect(),
                        },
                    ));
                }
            };

            let flag = &mut flags[index];
            let raw = match (inline, flag.kind()) {
                (Some(value), _) => value,
                (None, FlagKind::Switch) => String::new(),
                (None, FlagKind::Value) => match tokens.next_if(|next| !FLAG_LIKE.is_match(next)) {
                    Some(value) => value,
                    None => return Err(ResolveError::new(id, UsageError::MissingValue(ident))),
                },
            };

            if let Err(source) = flag.update_value(&raw) {
                if strict {
                    return Err(ResolveError::new(
                        id,
                        UsageError::InvalidValue {
                            flag: ident,
                            source,
                        },
                    ));
                }
                warn!(flag = %ident, error = %source, "Ignoring unparsable flag value");
            }
        }

        Ok(positional)
    }

    fn run_hook<O: Write, E: Write>(
        &mut self,
        id: CommandId,
        hook: Hook,
        invocation: &Invocation,
        console: &mut Console<O, E>,
    ) {
        let command = self.command_mut(id);
        let (callback, stage) = match hook {
            Hook::PreRun => (command.pre_run.as_mut(), "Pre-run"),
            Hook::PostRun => (command.post_run.as_mut(), "Post-run"),
        };
        let Some(callback) = callback else {
            return;
        };
        if let Err(err) = callback(invocation) {
            warn!(command = %invocation.command, stage, error = %err, "Callback failed");
            report(console.error(format!(
                "{stage} of the {} command failed: {err}",
                invocation.command
            )));
        }
    }
}

/// File name of the executable, minus the platform executable suffix.
///
/// Other dots are kept, so a root named `app.v2` matches `/usr/bin/app.v2`.
fn executable_name(program: &str) -> String {
    let name = Path::new(program)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !EXE_SUFFIX.is_empty() {
        if let Some(stem) = name.strip_suffix(EXE_SUFFIX) {
            return stem.to_string();
        }
    }
    name
}

fn report(result: std::io::Result<()>) {
    if let Err(err) = result {
        warn!(error = %err, "Failed to write to console");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_token_grammar() {
        let caps = FLAG_TOKEN.captures("--count=5").unwrap();
        assert_eq!(&caps[1], "--count");
        assert_eq!(&caps[3], "5");

        let caps = FLAG_TOKEN.captures("-n42").unwrap();
        assert_eq!(&caps[1], "-n");
        assert_eq!(&caps[3], "42");

        let caps = FLAG_TOKEN.captures("--verbose").unwrap();
        assert_eq!(&caps[1], "--verbose");
        assert!(caps.get(3).is_none());

        assert!(FLAG_TOKEN.captures("--x").is_none());
        assert!(FLAG_TOKEN.captures("-").is_none());
        assert!(FLAG_TOKEN.captures("plain").is_none());
    }

    #[test]
    fn test_flag_like_lookahead() {
        assert!(FLAG_LIKE.is_match("-v"));
        assert!(FLAG_LIKE.is_match("--out"));
        assert!(FLAG_LIKE.is_match("-5"));
        assert!(!FLAG_LIKE.is_match("--x"));
        assert!(!FLAG_LIKE.is_match("value"));
        assert!(!FLAG_LIKE.is_match("-"));
    }

    #[test]
    fn test_flag_grammar_is_ascii_only() {
        assert!(FLAG_TOKEN.captures("-é").is_none());
        assert!(FLAG_TOKEN.captures("--été").is_none());
        assert!(!FLAG_LIKE.is_match("-é"));
        assert!(!FLAG_LIKE.is_match("--ñx"));

        let caps = FLAG_TOKEN.captures("--name=é").unwrap();
        assert_eq!(&caps[1], "--name");
        assert_eq!(&caps[3], "é");
    }

    #[test]
    fn test_executable_name_strips_dirs_and_exe_suffix() {
        assert_eq!(executable_name("/usr/local/bin/app"), "app");
        assert_eq!(
            executable_name(&format!("target/debug/app{EXE_SUFFIX}")),
            "app"
        );
        assert_eq!(executable_name("/usr/bin/app.v2"), "app.v2");
        assert_eq!(executable_name(""), "");
    }
}
