//! Demo host: a small clap CLI with completions bound to every action kind.

use clap::{ArgGroup, Args, Parser, Subcommand};

use compline::registry::Registry;
use compline::{Action, ActionMap, CommandDef};

#[derive(Debug, Parser)]
#[command(
    name = "compline",
    about = "Shell completion engine demo",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Print more detail
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Action example
    #[command(visible_alias = "alias")]
    Action(ActionArgs),
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("format").args(["json", "yaml"])))]
struct ActionArgs {
    /// Files flag
    #[arg(short, long)]
    files: Option<String>,

    /// Groups flag
    #[arg(short, long)]
    groups: Option<String>,

    /// Hosts flag
    #[arg(long)]
    hosts: Option<String>,

    /// Message flag
    #[arg(short, long)]
    message: Option<String>,

    /// Network interfaces flag
    #[arg(short, long)]
    net_interfaces: Option<String>,

    /// Executables in PATH
    #[arg(long)]
    path_files: Option<String>,

    /// Users flag
    #[arg(short, long)]
    users: Option<String>,

    /// Values flag
    #[arg(short, long)]
    values: Option<String>,

    /// Values with description flag
    #[arg(short = 'd', long)]
    values_described: Option<String>,

    /// Multi parts flag
    #[arg(long)]
    multi_parts: Option<String>,

    /// Git branch
    #[arg(short, long)]
    branch: Option<String>,

    /// When to colorize
    #[arg(long, value_name = "WHEN", num_args = 0..=1, require_equals = true, default_missing_value = "auto")]
    color: Option<String>,

    /// JSON output
    #[arg(long)]
    json: bool,

    /// YAML output
    #[arg(long)]
    yaml: bool,

    /// Positional arguments
    positional: Vec<String>,
}

impl Cli {
    /// One line per argument that was given.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if self.verbose {
            lines.push("verbose: true".to_string());
        }
        let Some(Commands::Action(action)) = &self.command else {
            lines.push("no subcommand given".to_string());
            return lines.join("\n");
        };

        let options = [
            ("files", &action.files),
            ("groups", &action.groups),
            ("hosts", &action.hosts),
            ("message", &action.message),
            ("net-interfaces", &action.net_interfaces),
            ("path-files", &action.path_files),
            ("users", &action.users),
            ("values", &action.values),
            ("values-described", &action.values_described),
            ("multi-parts", &action.multi_parts),
            ("branch", &action.branch),
            ("color", &action.color),
        ];
        for (name, value) in options {
            if let Some(value) = value {
                lines.push(format!("{}: {}", name, value));
            }
        }
        if action.json {
            lines.push("format: json".to_string());
        }
        if action.yaml {
            lines.push("format: yaml".to_string());
        }
        if !action.positional.is_empty() {
            lines.push(format!("positional: {}", action.positional.join(" ")));
        }
        lines.join("\n")
    }
}

/// Completion bindings for the tree imported from [`Cli`].
pub fn registry(root: &CommandDef) -> Registry {
    let mut builder = Registry::builder();

    if let Some(action) = root.find_subcommand("action") {
        builder
            .command(action)
            .flags(ActionMap::from([
                ("files".to_string(), Action::files(".rs")),
                ("groups".to_string(), Action::groups()),
                ("hosts".to_string(), Action::hosts()),
                ("message".to_string(), Action::message("message example")),
                ("net-interfaces".to_string(), Action::net_interfaces()),
                ("path-files".to_string(), Action::path_files("")),
                ("users".to_string(), Action::users()),
                ("values".to_string(), Action::values(["values", "example"])),
                (
                    "values-described".to_string(),
                    Action::values_described([
                        ("values", "valueDescription"),
                        ("example", "exampleDescription"),
                    ]),
                ),
                (
                    "multi-parts".to_string(),
                    Action::multi_parts(
                        '/',
                        [
                            "multi/parts",
                            "multi/parts/example",
                            "multi/parts/test",
                            "example/parts",
                        ],
                    ),
                ),
                ("branch".to_string(), branches()),
                (
                    "color".to_string(),
                    Action::values(["always", "auto", "never"]),
                ),
            ]))
            .positional([
                Action::values(["positional1", "p1"]),
                Action::values(["positional2", "p2"]),
            ])
            .dash_any(Action::files("").usage("files after --"));
    }

    builder.build()
}

fn branches() -> Action {
    Action::exec_command("git", ["branch", "--format=%(refname:short)"], |output| {
        Action::values(
            String::from_utf8_lossy(output)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect::<Vec<_>>(),
        )
        .style("magenta")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn bindings_match_declared_flags() {
        let root = CommandDef::from(&Cli::command());
        assert!(registry(&root).check(&root).is_empty());
    }

    #[test]
    fn imported_tree_carries_capabilities() {
        let root = CommandDef::from(&Cli::command());
        let action = root.find_subcommand("alias").unwrap();
        assert_eq!(action.name, "action");
        assert_eq!(action.exclusive_groups, vec![vec!["json", "yaml"]]);

        let color = action.flags.iter().find(|f| f.long == "color").unwrap();
        assert!(color.is_optarg());
        let verbose = root.flags.iter().find(|f| f.long == "verbose").unwrap();
        assert!(verbose.persistent);
    }

    #[test]
    fn summary_lists_given_arguments() {
        let cli = Cli::parse_from(["compline", "action", "--values", "x", "--json", "pos"]);
        assert_eq!(cli.summary(), "values: x\nformat: json\npositional: pos");
    }
}
