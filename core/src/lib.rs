//! Command trees and single-pass argument resolution.
//!
//! This crate builds a tree of named commands, each with its own flags and
//! subcommands, and resolves a raw argument vector against it:
//!
//! - [`Flag`] — a flag with optional short (`-v`) and long (`--verbose`)
//!   forms, a [`FlagKind`] and a value parser.
//! - [`Command`] — a named node with flags and `pre_run`/`run`/`post_run`
//!   callbacks.
//! - [`CommandTree`] — the arena linking commands together; it resolves
//!   argv ([`CommandTree::resolve`], [`CommandTree::execute`]) and renders
//!   help pages ([`CommandTree::help_page`]).
//!
//! The grammar is fixed: `-x` / `--xx` flags with inline (`--n=3`, `-n3`) or
//! separate values, one subcommand per level, `--` before passthrough
//! arguments, and `help`/`--help`/`-h` as the first token for help.
//!
//! Validation ([`validate_tree`]) reports trees that cannot be driven from
//! the command line as declared. [`CommandTree::describe`] and
//! [`format_description`] export a tree as JSON, YAML or Markdown.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use cmdtree_core::*;
//!
//! let seen = Rc::new(RefCell::new(None));
//! let sink = Rc::clone(&seen);
//!
//! let mut tree = CommandTree::new(Command::new("app", "Demo app", |_| Ok(())));
//! tree.add_flag(tree.root(), Flag::switch("verbose").short("v").long("verbose")).unwrap();
//! let build = tree.add_subcommand(
//!     tree.root(),
//!     Command::new("build", "Build the project", move |inv| {
//!         *sink.borrow_mut() = inv.flags.get_as::<i64>("count")?;
//!         Ok(())
//!     }),
//! );
//! tree.add_flag(build, Flag::integer("count").long("count").with_default(0)).unwrap();
//!
//! let outcome = tree.resolve(["app", "-v", "build", "--count", "5"]).unwrap();
//! assert_eq!(outcome, Outcome::Completed { dispatched: vec![tree.root(), build] });
//! assert_eq!(*seen.borrow(), Some(5));
//! ```

mod command;
mod console;
mod describe;
mod error;
mod flag;
mod help;
mod invocation;
mod resolve;
mod settings;
mod validate;

pub use command::{Callback, Command, CommandId, CommandTree};
pub use console::Console;
pub use describe::{
    CommandDescription, FlagDescription, FormatError, OutputFormat, format_description,
};
pub use error::{ConfigError, ResolveError, Result, UsageError};
pub use flag::{Flag, FlagKind, ValueParseError, ValueParser};
pub use invocation::{FlagValues, Invocation};
pub use resolve::Outcome;
pub use settings::{Settings, SettingsError};
pub use validate::{ValidationError, validate_tree};
