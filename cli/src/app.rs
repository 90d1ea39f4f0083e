//! The demo command tree.

use std::cell::OnceCell;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use cmdtree_core::{
    Command, CommandDescription, CommandTree, ConfigError, Console, Flag, Invocation,
    OutputFormat, Settings, format_description,
};

pub const ROOT: &str = "cmdtree";

/// Builds the tree driven by the `cmdtree` binary.
///
/// `describe` prints a snapshot of this same tree, taken once the tree is
/// complete.
pub fn build(settings: Settings) -> Result<CommandTree, ConfigError> {
    let snapshot: Rc<OnceCell<CommandDescription>> = Rc::new(OnceCell::new());

    let root = Command::new(ROOT, "Drive a sample command tree from the command line", run_root)
        .with_long_description(
            "Drive a sample command tree from the command line.\n\
             Flags go before or after the subcommand name; tokens after -- are passed through.",
        )
        .with_flag(
            Flag::switch("verbose")
                .short("v")
                .long("verbose")
                .usage("print each resolved invocation"),
        )?;
    let mut tree = CommandTree::new(root).with_settings(settings);
    let root = tree.root();

    let greet = tree.add_subcommand(root, Command::new("greet", "Greet people by name", run_greet));
    tree.add_flag(
        greet,
        Flag::integer("times")
            .short("t")
            .long("times")
            .usage("how many times to greet")
            .with_default(1),
    )?;
    tree.add_flag(
        greet,
        Flag::switch("shout")
            .short("s")
            .long("shout")
            .usage("greet in capitals"),
    )?;

    let inspect = tree.add_subcommand(
        root,
        Command::new("inspect", "Print the resolved invocation as JSON", run_inspect),
    );
    tree.add_flag(
        inspect,
        Flag::text("label")
            .short("l")
            .long("label")
            .usage("free-form text"),
    )?;
    tree.add_flag(
        inspect,
        Flag::float("ratio")
            .short("r")
            .long("ratio")
            .usage("a number"),
    )?;
    tree.add_flag(
        inspect,
        Flag::list("tags")
            .long("tags")
            .usage("comma-separated values"),
    )?;

    let deploy = tree.add_subcommand(
        root,
        Command::new("deploy", "Pretend to deploy to an environment", run_deploy),
    );
    tree.add_flag(
        deploy,
        Flag::text("environment")
            .short("e")
            .long("env")
            .usage("target environment")
            .required(),
    )?;
    tree.add_flag(
        deploy,
        Flag::switch("dry")
            .long("dry")
            .usage("only print what would happen"),
    )?;

    let cell = Rc::clone(&snapshot);
    let describe = tree.add_subcommand(
        root,
        Command::new("describe", "Export this command tree", move |inv| {
            run_describe(inv, cell.get())
        }),
    );
    tree.add_flag(
        describe,
        Flag::text("format")
            .short("f")
            .long("format")
            .usage("json, yaml or markdown")
            .with_default("json"),
    )?;

    snapshot.get_or_init(|| tree.describe(root));
    Ok(tree)
}

fn run_root(inv: &Invocation) -> Result<()> {
    if inv.flags.get_as::<bool>("verbose")?.unwrap_or(false) {
        print_invocation(inv)?;
    }
    Ok(())
}

fn run_greet(inv: &Invocation) -> Result<()> {
    let times = inv.flags.get_as::<i64>("times")?.unwrap_or(1);
    if times < 0 {
        bail!("--times cannot be negative, got {times}");
    }
    let shout = inv.flags.get_as::<bool>("shout")?.unwrap_or(false);

    let names = if inv.args.is_empty() {
        "world".to_string()
    } else {
        inv.args.join(", ")
    };
    let mut line = format!("Hello, {names}!");
    if shout {
        line = line.to_uppercase();
    }

    let mut console = Console::stdio();
    for _ in 0..times {
        console.write_raw(&format!("{line}\n"))?;
    }
    Ok(())
}

fn run_inspect(inv: &Invocation) -> Result<()> {
    print_invocation(inv)
}

fn run_deploy(inv: &Invocation) -> Result<()> {
    let environment: String = inv
        .flags
        .get_as("environment")?
        .context("environment flag has no value")?;
    let dry = inv.flags.get_as::<bool>("dry")?.unwrap_or(false);

    let mut console = Console::stdio();
    if dry {
        console.info(format!("would deploy to {environment}"))?;
    } else {
        console.success(format!("deployed to {environment}"))?;
    }
    Ok(())
}

fn run_describe(inv: &Invocation, snapshot: Option<&CommandDescription>) -> Result<()> {
    let snapshot = snapshot.context("command tree snapshot is not ready")?;
    let format: OutputFormat = inv
        .flags
        .get_as::<String>("format")?
        .unwrap_or_else(|| "json".to_string())
        .parse()?;

    let mut rendered = format_description(snapshot, format)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Console::stdio().write_raw(&rendered)?;
    Ok(())
}

fn print_invocation(inv: &Invocation) -> Result<()> {
    let json = serde_json::to_string_pretty(inv)?;
    Console::stdio().write_raw(&format!("{json}\n"))?;
    Ok(())
}
