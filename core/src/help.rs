//! Help page rendering.

use crate::command::{CommandId, CommandTree};

impl CommandTree {
    /// Renders the help page of `id`.
    ///
    /// The usage line joins the names from the root down to `id`, followed by
    /// `[OPTIONS]` when the command has flags and `COMMAND` when it has
    /// subcommands.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::{Command, CommandTree, Flag};
    ///
    /// let mut tree = CommandTree::new(Command::new("app", "Demo app", |_| Ok(())));
    /// let build = tree.add_subcommand(
    ///     tree.root(),
    ///     Command::new("build", "Build the project", |_| Ok(()))
    ///         .with_long_description("Compile every target in the project."),
    /// );
    /// tree.add_flag(build, Flag::integer("jobs").short("j").long("jobs").usage("parallel jobs")).unwrap();
    ///
    /// assert_eq!(
    ///     tree.help_page(build),
    ///     "Usage: app build [OPTIONS]\n\
    ///      Compile every target in the project.\n\
    ///      Options:\n\
    ///      -j\t--jobs\tjobs\tUsage: parallel jobs\t(optional)\n"
    /// );
    /// ```
    pub fn help_page(&self, id: CommandId) -> String {
        let command = self.command(id);
        let mut usage = self.path(id).join(" ");
        if !command.flags().is_empty() {
            usage.push_str(" [OPTIONS]");
        }
        if !command.children().is_empty() {
            usage.push_str(" COMMAND");
        }

        let mut out = format!("Usage: {usage}\n");
        out.push_str(command.long_description().unwrap_or(command.description()));
        out.push('\n');

        if !command.flags().is_empty() {
            out.push_str("Options:\n");
            for flag in command.flags() {
                out.push_str(&format!("{flag}\n"));
            }
        }

        if !command.children().is_empty() {
            out.push_str("Commands:\n");
            for &child in command.children() {
                let child = self.command(child);
                out.push_str(&format!("{}\t{}\n", child.name(), child.description()));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use crate::{Command, CommandTree, Flag};

    #[test]
    fn test_root_help_lists_flags_and_commands() {
        let mut tree = CommandTree::new(Command::new("app", "Demo app", |_| Ok(())));
        let root = tree.root();
        tree.add_flag(root, Flag::switch("verbose").short("v").long("verbose"))
            .unwrap();
        tree.add_subcommand(root, Command::new("build", "Build it", |_| Ok(())));
        tree.add_subcommand(root, Command::new("test", "Test it", |_| Ok(())));

        let help = tree.help_page(root);
        assert_eq!(
            help,
            "Usage: app [OPTIONS] COMMAND\n\
             Demo app\n\
             Options:\n\
             -v\t--verbose\tverbose\tUsage: \t(optional)\n\
             Commands:\n\
             build\tBuild it\n\
             test\tTest it\n"
        );
    }

    #[test]
    fn test_bare_command_has_plain_usage() {
        let tree = CommandTree::new(Command::new("tool", "Does one thing", |_| Ok(())));
        assert_eq!(tree.help_page(tree.root()), "Usage: tool\nDoes one thing\n");
    }

    #[test]
    fn test_nested_usage_walks_parents() {
        let mut tree = CommandTree::new(Command::new("git", "vcs", |_| Ok(())));
        let remote = tree.add_subcommand(tree.root(), Command::new("remote", "remotes", |_| Ok(())));
        let add = tree.add_subcommand(remote, Command::new("add", "add a remote", |_| Ok(())));

        assert!(tree.help_page(add).starts_with("Usage: git remote add\n"));
        assert!(tree.help_page(remote).starts_with("Usage: git remote COMMAND\n"));
    }
}
