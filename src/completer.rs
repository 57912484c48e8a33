//! Completion engine: one request from raw tokens to resolved candidates.
//!
//! ```text
//! Context.args ─► scan ─► chain / changed / positionals / dash / pending
//!                                        │
//! Context.value ─► classify ─────────────┴─► slot ─► Registry ─► Action ─► invoke
//! ```
//!
//! Slot selection, first match wins:
//! 1. after a literal `--`: dash argument
//! 2. a flag still waiting for its value: that flag's value
//! 3. the current word starts with `-`: an inline flag value, a shorthand
//!    continuation, or flag names
//! 4. otherwise: positional argument (plus subcommand names at index 0)

use std::path::PathBuf;

use crate::action::{Action, InvokedAction, RawValue};
use crate::command::{classify, scan, CommandDef, FlagDef, FlagSet, Scan, TokenRole};
use crate::config::Config;
use crate::context::{Context, Mock};
use crate::export::SANDBOX_ENV;
use crate::registry::{Registry, Slot};
use crate::render::{self, ExportRenderer, Renderer};

/// Action chosen for the current word, and the word it completes.
enum Selection {
    Whole(Action),
    /// `--flag=par`, `-fpar`, `-o=par`: complete `value` and keep `flag_part`.
    Inline {
        flag_part: String,
        value: String,
        action: Action,
    },
}

/// Resolves completion requests for one command tree.
pub struct Completer<'r> {
    root: CommandDef,
    registry: &'r Registry,
    config: Config,
}

impl<'r> Completer<'r> {
    pub fn new(root: CommandDef, registry: &'r Registry) -> Self {
        Self {
            root,
            registry,
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Candidates for `context.value`, unfiltered and unsorted.
    pub fn complete(&self, context: &Context) -> InvokedAction {
        let state = scan(&self.root, &context.args);
        for warning in &state.warnings {
            tracing::debug!(command = %state.command().id(), "{}", warning);
        }

        match self.select(&state, &context.value) {
            Selection::Whole(action) => action.invoke(context),
            Selection::Inline {
                flag_part,
                value,
                action,
            } => {
                let mut inner = context.clone();
                inner.value = value;
                action.prefix(flag_part).invoke(&inner)
            }
        }
    }

    /// Answer a `<shell> <tokens…> <current word>` request.
    ///
    /// A mock bundle in `COMPLINE_SANDBOX` replaces external commands and
    /// moves the working directory into the sandbox.
    pub fn serve(&self, args: &[String]) -> String {
        let Some((shell, tokens)) = args.split_first() else {
            return ExportRenderer.render(
                &InvokedAction::message("missing shell name"),
                &Context::default(),
            );
        };

        let mut context = Context::from_process(tokens.iter().cloned());
        if let Ok(bundle) = std::env::var(SANDBOX_ENV) {
            match serde_json::from_str::<Mock>(&bundle) {
                Ok(mock) => {
                    if !mock.dir.is_empty() {
                        context.dir = PathBuf::from(&mock.dir);
                    }
                    context.mock = Some(mock);
                }
                Err(err) => tracing::warn!(error = %err, "ignoring malformed sandbox bundle"),
            }
        }

        tracing::info!(shell = %shell, args = ?context.args, value = %context.value, "completion request");

        match render::for_shell(shell, &self.config.styles) {
            Some(renderer) => renderer.render(&self.complete(&context), &context),
            None => ExportRenderer.render(
                &InvokedAction::message(format!(
                    "unsupported shell '{}' (expected one of: {})",
                    shell,
                    render::SHELLS.join(", ")
                )),
                &context,
            ),
        }
    }

    fn select(&self, state: &Scan<'_>, current: &str) -> Selection {
        if let Some(dash) = &state.dash {
            return Selection::Whole(self.registry.resolve(&state.chain, Slot::Dash(dash.len())));
        }

        if let Some(flag) = state.pending {
            return Selection::Whole(self.flag_value(state, flag));
        }

        let command = state.command();
        if command.disable_flag_parsing || !current.starts_with('-') {
            return Selection::Whole(self.positional(state));
        }

        let flags = state.flag_set();
        match classify(&flags, current) {
            role @ (TokenRole::LongFlag { .. } | TokenRole::ShortCluster { .. }) => {
                match (role.flag(), role.value()) {
                    (Some(flag), Some(value)) if flag.accepts_value() => Selection::Inline {
                        flag_part: current[..current.len() - value.len()].to_string(),
                        value: value.to_string(),
                        action: self.flag_value(state, flag),
                    },
                    // value for a flag that takes none
                    (_, Some(_)) => Selection::Whole(Action::default()),
                    _ => match &role {
                        TokenRole::ShortCluster { flags: series, .. } => Selection::Whole(
                            self.shorthand_continuations(state, &flags, current, series),
                        ),
                        _ => Selection::Whole(self.flag_names(state, &flags, current)),
                    },
                }
            }
            TokenRole::UnknownFlag | TokenRole::PlainValue => {
                Selection::Whole(self.flag_names(state, &flags, current))
            }
        }
    }

    fn flag_value(&self, state: &Scan<'_>, flag: &FlagDef) -> Action {
        let action = self.registry.resolve(&state.chain, Slot::Flag(&flag.long));
        if self.config.styles.flag_value.is_empty() {
            action
        } else {
            action.style(self.config.styles.flag_value.clone())
        }
    }

    fn positional(&self, state: &Scan<'_>) -> Action {
        let index = state.positionals.len();
        let action = self.registry.resolve(&state.chain, Slot::Positional(index));
        if index > 0 {
            return action;
        }

        let subcommands: Vec<RawValue> = state
            .command()
            .subcommands
            .iter()
            .filter(|c| self.config.completion.show_hidden || !c.hidden)
            .map(|c| {
                RawValue::new(c.name.clone())
                    .description(c.description.clone())
                    .style(self.config.styles.subcommand.clone())
            })
            .collect();

        if subcommands.is_empty() {
            action
        } else {
            Action::batch([Action::Values(subcommands), action])
        }
    }

    /// Whether `flag` should still be offered.
    fn offerable(&self, state: &Scan<'_>, flags: &FlagSet<'_>, flag: &FlagDef) -> bool {
        if flag.hidden && !self.config.completion.show_hidden {
            return false;
        }
        if state.is_changed(&flag.long) && !flag.repeatable {
            return false;
        }
        !flags.is_mutually_exclusive(flag, &state.changed)
    }

    fn flag_names(&self, state: &Scan<'_>, flags: &FlagSet<'_>, current: &str) -> Action {
        let long_prefix = if flags.is_posix() { "--" } else { "-" };
        let with_shorthand = flags.is_posix() && !current.starts_with("--");

        let mut values = Vec::new();
        for flag in flags.iter().filter(|f| self.offerable(state, flags, f)) {
            values.push(self.flag_candidate(format!("{}{}", long_prefix, flag.long), flag));
            if let (true, Some(short)) = (with_shorthand, flag.short) {
                values.push(self.flag_candidate(format!("-{}", short), flag));
            }
        }
        Action::Values(values)
    }

    /// `-ab` → itself plus `-abc` for every boolean shorthand `c` still offerable.
    fn shorthand_continuations(
        &self,
        state: &Scan<'_>,
        flags: &FlagSet<'_>,
        current: &str,
        series: &[&FlagDef],
    ) -> Action {
        let mut values = Vec::new();
        if let Some(last) = series.last() {
            values.push(self.flag_candidate(current.to_string(), last));
            if last.takes_value() {
                return Action::Values(values);
            }
        }

        for flag in flags.iter().filter(|f| self.offerable(state, flags, f)) {
            let Some(short) = flag.short else {
                continue;
            };
            if !flag.repeatable && series.iter().any(|s| s.long == flag.long) {
                continue;
            }
            values.push(self.flag_candidate(format!("{}{}", current, short), flag));
        }
        Action::Values(values)
    }

    fn flag_candidate(&self, value: String, flag: &FlagDef) -> RawValue {
        RawValue::new(value)
            .description(flag.description.clone())
            .style(self.config.styles.flag.clone())
    }
}
