//! Import a `clap::Command` tree into the command model.

use clap::{Arg, ArgAction, Command};

use crate::command::{CommandDef, FlagArity, FlagDef};

impl From<&Command> for CommandDef {
    /// Builds a clone of `command` first so that generated flags
    /// (`--help`, `--version`) and defaulted actions are visible.
    fn from(command: &Command) -> Self {
        let mut built = command.clone();
        built.build();
        convert(&built)
    }
}

fn convert(command: &Command) -> CommandDef {
    let mut def = CommandDef::new(command.get_name());
    def.description = command
        .get_about()
        .map(|about| about.to_string())
        .unwrap_or_default();
    def.aliases = command.get_all_aliases().map(String::from).collect();
    def.hidden = command.is_hide_set();

    def.flags = command
        .get_arguments()
        .filter(|arg| !arg.is_positional())
        .map(flag_def)
        .collect();

    for group in command.get_groups() {
        if group.clone().is_multiple() {
            continue;
        }
        let names: Vec<String> = group
            .get_args()
            .filter_map(|id| command.get_arguments().find(|arg| arg.get_id() == id))
            .map(long_name)
            .collect();
        if names.len() > 1 {
            def.exclusive_groups.push(names);
        }
    }

    for sub in command.get_subcommands() {
        def = def.subcommand(convert(sub));
    }
    def
}

fn long_name(arg: &Arg) -> String {
    arg.get_long()
        .map(String::from)
        .unwrap_or_else(|| arg.get_id().to_string())
}

fn flag_def(arg: &Arg) -> FlagDef {
    let action = arg.get_action();
    let arity = if !action.takes_values() {
        FlagArity::NoValue
    } else if arg.get_num_args().is_some_and(|range| range.min_values() == 0) {
        FlagArity::OptionalValue
    } else {
        FlagArity::RequiresValue
    };

    FlagDef {
        long: long_name(arg),
        short: arg.get_short(),
        arity,
        optarg_delimiter: '=',
        hidden: arg.is_hide_set(),
        persistent: arg.is_global_set(),
        repeatable: matches!(action, ArgAction::Append | ArgAction::Count),
        description: arg.get_help().map(|help| help.to_string()).unwrap_or_default(),
    }
}
