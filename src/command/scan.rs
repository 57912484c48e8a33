//! Argument scan: prior tokens → command chain, set flags, positionals.

use crate::command::classifier::{classify, TokenRole};
use crate::command::{CommandDef, FlagDef, FlagSet};

/// Parse state reached after walking the tokens preceding the current word.
#[derive(Debug, Clone)]
pub struct Scan<'a> {
    /// Commands entered so far, root first.
    pub chain: Vec<&'a CommandDef>,
    /// Long names of flags that were set, in order.
    pub changed: Vec<String>,
    /// Positional arguments of the innermost command.
    pub positionals: Vec<String>,
    /// Arguments after a literal `--`, if one was seen.
    pub dash: Option<Vec<String>>,
    /// Flag still waiting for its value: the current word is that value.
    pub pending: Option<&'a FlagDef>,
    /// Tokens that looked like flags but matched nothing.
    pub warnings: Vec<String>,
}

impl<'a> Scan<'a> {
    /// Innermost command entered.
    pub fn command(&self) -> &'a CommandDef {
        self.chain[self.chain.len() - 1]
    }

    /// Effective flags of the innermost command.
    pub fn flag_set(&self) -> FlagSet<'a> {
        FlagSet::for_chain(&self.chain)
    }

    pub fn is_changed(&self, long: &str) -> bool {
        self.changed.iter().any(|c| c == long)
    }
}

/// Walk `args` (tokens after the program name) starting at `root`.
pub fn scan<'a>(root: &'a CommandDef, args: &[String]) -> Scan<'a> {
    let mut state = Scan {
        chain: vec![root],
        changed: Vec::new(),
        positionals: Vec::new(),
        dash: None,
        pending: None,
        warnings: Vec::new(),
    };

    for arg in args {
        if let Some(dash) = state.dash.as_mut() {
            dash.push(arg.clone());
            continue;
        }

        // Value of the preceding flag, whatever it looks like
        if state.pending.take().is_some() {
            continue;
        }

        let command = state.command();
        if command.disable_flag_parsing {
            state.positionals.push(arg.clone());
            continue;
        }

        if arg == "--" {
            state.dash = Some(Vec::new());
            continue;
        }

        if arg.starts_with('-') && arg != "-" {
            let flags = state.flag_set();
            match classify(&flags, arg) {
                role @ (TokenRole::LongFlag { .. } | TokenRole::ShortCluster { .. }) => {
                    for flag in role.flags() {
                        state.changed.push(flag.long.clone());
                    }
                    if let Some(flag) = role.flag() {
                        if flag.takes_value() && role.value().is_none() {
                            state.pending = Some(flag);
                        }
                    }
                }
                TokenRole::UnknownFlag => {
                    state.warnings.push(format!("{}: unknown flag", arg));
                }
                TokenRole::PlainValue => state.positionals.push(arg.clone()),
            }
            continue;
        }

        if state.positionals.is_empty() {
            if let Some(sub) = command.find_subcommand(arg) {
                state.chain.push(sub);
                continue;
            }
        }

        state.positionals.push(arg.clone());
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> CommandDef {
        CommandDef::new("demo")
            .flag(FlagDef::value("config").short('c').persistent())
            .subcommand(
                CommandDef::new("action")
                    .flag(FlagDef::new("all").short('a'))
                    .flag(FlagDef::value("values").short('v')),
            )
            .subcommand(CommandDef::new("raw").disable_flag_parsing())
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn descends_into_subcommands() {
        let root = tree();
        let state = scan(&root, &args(&["action", "pos"]));
        assert_eq!(state.command().name, "action");
        assert_eq!(state.positionals, vec!["pos"]);
    }

    #[test]
    fn subcommand_names_after_positionals_are_positionals() {
        let root = tree();
        let state = scan(&root, &args(&["action", "pos", "raw"]));
        assert_eq!(state.command().name, "action");
        assert_eq!(state.positionals, vec!["pos", "raw"]);
    }

    #[test]
    fn flag_values_are_consumed() {
        let root = tree();
        let state = scan(&root, &args(&["--config", "action", "action", "-v", "x"]));
        assert_eq!(state.command().name, "action");
        assert!(state.positionals.is_empty());
        assert!(state.is_changed("config"));
        assert!(state.is_changed("values"));
        assert!(state.pending.is_none());
    }

    #[test]
    fn trailing_flag_is_pending() {
        let root = tree();
        let state = scan(&root, &args(&["action", "-av"]));
        assert_eq!(state.pending.map(|f| f.long.as_str()), Some("values"));
        assert!(state.is_changed("all"));
    }

    #[test]
    fn inline_value_is_not_pending() {
        let root = tree();
        let state = scan(&root, &args(&["action", "--values=x"]));
        assert!(state.pending.is_none());
    }

    #[test]
    fn dash_collects_remaining_args() {
        let root = tree();
        let state = scan(&root, &args(&["action", "a", "--", "-v", "b"]));
        assert_eq!(state.positionals, vec!["a"]);
        assert_eq!(state.dash, Some(args(&["-v", "b"])));
    }

    #[test]
    fn disabled_flag_parsing_keeps_everything_positional() {
        let root = tree();
        let state = scan(&root, &args(&["raw", "--config", "--", "x"]));
        assert_eq!(state.positionals, args(&["--config", "--", "x"]));
        assert!(state.dash.is_none());
    }

    #[test]
    fn unknown_flags_warn() {
        let root = tree();
        let state = scan(&root, &args(&["--nope"]));
        assert_eq!(state.warnings, vec!["--nope: unknown flag"]);
    }
}
