use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use resolver_cli::{
    build_tree, merge_trees, render_level_order, render_summary, CliConfig, LogConfig,
};
use resolver_tree::NodeId;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn nodes_arg(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(long)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn origin_arg() -> Arg {
    Arg::new("origin")
        .long("origin")
        .help("Id of the node counts are measured from")
}

fn cli() -> Command {
    Command::new("resolver")
        .version(resolver_tree::VERSION)
        .about("Index, walk and merge resolver process trees")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .subcommand(
            Command::new("stats")
                .about("Print a JSON summary of a tree")
                .arg(nodes_arg("nodes", "nodes", "JSON array of node records"))
                .arg(origin_arg()),
        )
        .subcommand(
            Command::new("walk")
                .about("Print nodes in level order")
                .arg(nodes_arg("nodes", "nodes", "JSON array of node records")),
        )
        .subcommand(
            Command::new("merge")
                .about("Graft one tree under a node of another")
                .arg(nodes_arg("base", "base", "Base tree records"))
                .arg(nodes_arg("graft", "graft", "Records of the tree to attach"))
                .arg(
                    Arg::new("at")
                        .long("at")
                        .required(true)
                        .help("Id of the base node the graft root is attached to"),
                )
                .arg(origin_arg())
                .arg(
                    Arg::new("walk")
                        .long("walk")
                        .action(ArgAction::SetTrue)
                        .help("Also print the merged level order"),
                ),
        )
}

fn init_tracing(log: &LogConfig, verbose: bool) {
    let fallback = if verbose { "debug" } else { log.filter.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    // a subscriber may already be installed when embedded
    let _ = if log.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing --{name}"))
}

fn origin(args: &ArgMatches) -> Option<NodeId> {
    args.get_one::<String>("origin").map(|id| NodeId::from(id.as_str()))
}

/// Dispatch a parsed command line, returning newline-terminated output
fn run(matches: &ArgMatches, config: &CliConfig) -> anyhow::Result<String> {
    let mut output = match matches.subcommand() {
        Some(("stats", args)) => {
            let tree = build_tree(path(args, "nodes")?, origin(args).as_ref(), &config.index)?;
            render_summary(&tree)?
        }
        Some(("walk", args)) => {
            let tree = build_tree(path(args, "nodes")?, None, &config.index)?;
            render_level_order(&tree)
        }
        Some(("merge", args)) => {
            let attachment = args
                .get_one::<String>("at")
                .map(|id| NodeId::from(id.as_str()))
                .context("missing --at")?;
            let tree = merge_trees(
                path(args, "base")?,
                path(args, "graft")?,
                &attachment,
                origin(args).as_ref(),
                &config.index,
            )?;
            let mut output = render_summary(&tree)?;
            if args.get_flag("walk") {
                output.push('\n');
                output.push_str(&render_level_order(&tree));
            }
            output
        }
        _ => anyhow::bail!("no subcommand given"),
    };

    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let config = CliConfig::load_or_default(config_path)?;
    init_tracing(&config.log, matches.get_flag("verbose"));
    tracing::debug!(?config, "configuration loaded");

    print!("{}", run(&matches, &config)?);
    Ok(())
}
