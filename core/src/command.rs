//! Command nodes and the arena that links them into a tree.
//!
//! Commands are stored in a [`CommandTree`] and refer to each other through
//! [`CommandId`]s. A child records its parent id once; the link is used for
//! lookups (help rendering, validation) and never for ownership.

use std::collections::HashSet;

use tracing::debug;

use crate::error::ConfigError;
use crate::flag::Flag;
use crate::invocation::Invocation;
use crate::settings::Settings;

/// Callback run for a resolved command.
pub type Callback = Box<dyn FnMut(&Invocation) -> anyhow::Result<()>>;

/// Handle to a command stored in a [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(usize);

impl CommandId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named command with its flags, children and callbacks.
pub struct Command {
    name: String,
    description: String,
    long_description: Option<String>,
    flags: Vec<Flag>,
    children: Vec<CommandId>,
    parent: Option<CommandId>,
    pub(crate) run: Callback,
    pub(crate) pre_run: Option<Callback>,
    pub(crate) post_run: Option<Callback>,
}

impl Command {
    /// Creates a command that calls `run` when it is resolved.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        run: impl FnMut(&Invocation) -> anyhow::Result<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            long_description: None,
            flags: Vec::new(),
            children: Vec::new(),
            parent: None,
            run: Box::new(run),
            pre_run: None,
            post_run: None,
        }
    }

    /// Text shown on this command's own help page instead of the description.
    pub fn with_long_description(mut self, text: impl Into<String>) -> Self {
        self.long_description = Some(text.into());
        self
    }

    /// Runs before `run`. Failures are logged and do not stop the command.
    pub fn with_pre_run(
        mut self,
        pre_run: impl FnMut(&Invocation) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.pre_run = Some(Box::new(pre_run));
        self
    }

    /// Runs after `run` and after the selected subcommand, if any.
    /// Failures are logged and do not change the outcome.
    pub fn with_post_run(
        mut self,
        post_run: impl FnMut(&Invocation) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.post_run = Some(Box::new(post_run));
        self
    }

    /// Builder form of [`Command::add_flag`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FlagCollision`] if the flag collides.
    pub fn with_flag(mut self, flag: Flag) -> Result<Self, ConfigError> {
        self.add_flag(flag)?;
        Ok(self)
    }

    /// Registers a flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FlagCollision`] if the flag shares a short or
    /// long form with a flag already registered on this command.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::{Command, ConfigError, Flag};
    ///
    /// let mut cmd = Command::new("app", "demo", |_| Ok(()));
    /// cmd.add_flag(Flag::switch("verbose").short("v").long("verbose")).unwrap();
    ///
    /// let err = cmd.add_flag(Flag::switch("version").short("v")).unwrap_err();
    /// assert!(matches!(err, ConfigError::FlagCollision { .. }));
    /// assert_eq!(cmd.flags().len(), 1);
    /// ```
    pub fn add_flag(&mut self, flag: Flag) -> Result<(), ConfigError> {
        let existing: Vec<&Flag> = self
            .flags
            .iter()
            .filter(|f| f.collides_with(&flag))
            .collect();
        if !existing.is_empty() {
            return Err(ConfigError::FlagCollision {
                command: self.name.clone(),
                flag: flag.name().to_string(),
                existing: existing
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        debug!(command = %self.name, flag = %flag.name(), "Registered flag");
        self.flags.push(flag);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn long_description(&self) -> Option<&str> {
        self.long_description.as_deref()
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut [Flag] {
        &mut self.flags
    }

    /// Finds a flag by its display name.
    pub fn flag(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name() == name)
    }

    pub fn children(&self) -> &[CommandId] {
        &self.children
    }

    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("children", &self.children)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// Arena of commands rooted at the first command inserted.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{Command, CommandTree, Flag};
///
/// let mut tree = CommandTree::new(Command::new("app", "Demo app", |_| Ok(())));
/// let build = tree.add_subcommand(tree.root(), Command::new("build", "Build it", |_| Ok(())));
/// tree.add_flag(build, Flag::integer("jobs").short("j").long("jobs")).unwrap();
///
/// assert_eq!(tree.find(&["build"]), Some(build));
/// assert_eq!(tree.command(build).parent(), Some(tree.root()));
/// assert_eq!(tree.path(build), vec!["app", "build"]);
/// ```
#[derive(Debug)]
pub struct CommandTree {
    commands: Vec<Command>,
    settings: Settings,
}

impl CommandTree {
    pub fn new(root: Command) -> Self {
        Self {
            commands: vec![root],
            settings: Settings::default(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn root(&self) -> CommandId {
        CommandId(0)
    }

    /// Stores a command without attaching it anywhere.
    pub fn insert(&mut self, command: Command) -> CommandId {
        self.commands.push(command);
        CommandId(self.commands.len() - 1)
    }

    /// Stores `command` and attaches it under `parent`.
    pub fn add_subcommand(&mut self, parent: CommandId, command: Command) -> CommandId {
        let id = self.insert(command);
        self.attach(parent, id);
        id
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// The child's parent link is only set the first time; later attachments
    /// still list the child but leave its parent untouched.
    pub fn attach(&mut self, parent: CommandId, child: CommandId) {
        debug!(
            parent = %self.commands[parent.0].name,
            child = %self.commands[child.0].name,
            "Adding subcommand"
        );
        self.commands[parent.0].children.push(child);
        let node = &mut self.commands[child.0];
        match node.parent {
            None => node.parent = Some(parent),
            Some(_) => debug!(command = %node.name, "There's already a parent for command"),
        }
    }

    /// Registers a flag on the command `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FlagCollision`] on a short or long form clash.
    pub fn add_flag(&mut self, id: CommandId, flag: Flag) -> Result<(), ConfigError> {
        self.commands[id.0].add_flag(flag)
    }

    /// Returns the command behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different tree.
    pub fn command(&self, id: CommandId) -> &Command {
        &self.commands[id.0]
    }

    pub(crate) fn command_mut(&mut self, id: CommandId) -> &mut Command {
        &mut self.commands[id.0]
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = CommandId> {
        (0..self.commands.len()).map(CommandId)
    }

    /// Walks child names from the root.
    pub fn find(&self, path: &[&str]) -> Option<CommandId> {
        path.iter().try_fold(self.root(), |current, name| {
            self.commands[current.0]
                .children
                .iter()
                .copied()
                .find(|child| self.commands[child.0].name == *name)
        })
    }

    /// Parent chain of `id`, root first, ending with `id`.
    ///
    /// Stops early if the parent links loop back on themselves.
    pub fn ancestry(&self, id: CommandId) -> Vec<CommandId> {
        let mut chain = vec![id];
        let mut seen = HashSet::from([id]);
        let mut current = self.commands[id.0].parent;
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.commands[parent.0].parent;
        }
        chain.reverse();
        chain
    }

    /// Names along [`ancestry`](Self::ancestry).
    pub fn path(&self, id: CommandId) -> Vec<&str> {
        self.ancestry(id)
            .into_iter()
            .map(|c| self.commands[c.0].name.as_str())
            .collect()
    }
}
