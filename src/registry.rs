//! Completion registry: which action completes which slot of which command.
//!
//! ```text
//! RegistryBuilder (setup, single-threaded) → build() → Registry → install() → &'static Registry
//! ```
//!
//! Bindings are written once while building and only read afterwards.
//! Commands are keyed by their path (see [`CommandDef::id`]).

use std::collections::BTreeMap;
use std::sync::OnceLock;

use thiserror::Error;

use crate::action::{Action, ActionMap};
use crate::command::CommandDef;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Configuration errors found by [`Registry::check`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{command}: unknown flag '{flag}' has a completion bound")]
    UnknownFlag { command: String, flag: String },

    #[error("unknown command '{command}' has completions bound")]
    UnknownCommand { command: String },

    #[error("completion registry is already installed")]
    AlreadyInstalled,
}

/// What is being completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'s> {
    /// Value of the flag with this long name.
    Flag(&'s str),
    /// Positional argument at this index.
    Positional(usize),
    /// Argument at this index after a literal `--`.
    Dash(usize),
}

#[derive(Debug, Clone, Default)]
struct Entry {
    flags: ActionMap,
    positional: Vec<Action>,
    positional_any: Option<Action>,
    dash: Vec<Action>,
    dash_any: Option<Action>,
}

/// Collects bindings before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<String, Entry>,
}

impl RegistryBuilder {
    /// Start (or continue) binding completions for `command`.
    pub fn command(&mut self, command: &CommandDef) -> Binding<'_> {
        Binding {
            entry: self.entries.entry(command.id()).or_default(),
        }
    }

    pub fn build(self) -> Registry {
        tracing::debug!(commands = self.entries.len(), "completion registry built");
        Registry {
            entries: self.entries,
        }
    }
}

/// Bindings of a single command.
pub struct Binding<'b> {
    entry: &'b mut Entry,
}

impl Binding<'_> {
    /// Bind flag values; later bindings for the same name win.
    pub fn flags(&mut self, actions: ActionMap) -> &mut Self {
        self.entry.flags.extend(actions);
        self
    }

    pub fn flag(&mut self, name: impl Into<String>, action: Action) -> &mut Self {
        self.entry.flags.insert(name.into(), action);
        self
    }

    /// Bind positional arguments by index, replacing earlier ones.
    pub fn positional<I>(&mut self, actions: I) -> &mut Self
    where
        I: IntoIterator<Item = Action>,
    {
        self.entry.positional = actions.into_iter().collect();
        self
    }

    /// Bind every positional argument without an indexed binding.
    pub fn positional_any(&mut self, action: Action) -> &mut Self {
        self.entry.positional_any = Some(action);
        self
    }

    /// Bind arguments after `--` by index, replacing earlier ones.
    pub fn dash<I>(&mut self, actions: I) -> &mut Self
    where
        I: IntoIterator<Item = Action>,
    {
        self.entry.dash = actions.into_iter().collect();
        self
    }

    pub fn dash_any(&mut self, action: Action) -> &mut Self {
        self.entry.dash_any = Some(action);
        self
    }
}

/// Frozen completion bindings.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, Entry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Action bound to `slot` of the innermost command in `chain`.
    ///
    /// Flag bindings are searched from the innermost command outwards so
    /// persistent flags bound on an ancestor are found. An exact index beats
    /// the catch-all binding. Unbound slots complete nothing.
    pub fn resolve(&self, chain: &[&CommandDef], slot: Slot<'_>) -> Action {
        let found = match slot {
            Slot::Flag(name) => chain
                .iter()
                .rev()
                .filter_map(|command| self.entries.get(&command.id()))
                .find_map(|entry| entry.flags.get(name)),
            Slot::Positional(index) => self.innermost(chain).and_then(|entry| {
                entry
                    .positional
                    .get(index)
                    .or(entry.positional_any.as_ref())
            }),
            Slot::Dash(index) => self
                .innermost(chain)
                .and_then(|entry| entry.dash.get(index).or(entry.dash_any.as_ref())),
        };
        found.cloned().unwrap_or_default()
    }

    fn innermost(&self, chain: &[&CommandDef]) -> Option<&Entry> {
        chain.last().and_then(|command| self.entries.get(&command.id()))
    }

    /// Bindings that do not match a declared command or flag of `root`'s tree.
    pub fn check(&self, root: &CommandDef) -> Vec<RegistryError> {
        let mut commands = BTreeMap::new();
        collect(root, &mut commands);

        let mut errors = Vec::new();
        for (id, entry) in &self.entries {
            let Some(command) = commands.get(id.as_str()) else {
                errors.push(RegistryError::UnknownCommand {
                    command: id.clone(),
                });
                continue;
            };
            for name in entry.flags.keys() {
                if !command.flags.iter().any(|f| &f.long == name) {
                    errors.push(RegistryError::UnknownFlag {
                        command: id.clone(),
                        flag: name.clone(),
                    });
                }
            }
        }
        errors
    }

    /// Make this the process-wide registry. Only the first call succeeds.
    pub fn install(self) -> Result<&'static Registry, RegistryError> {
        GLOBAL
            .set(self)
            .map_err(|_| RegistryError::AlreadyInstalled)?;
        GLOBAL.get().ok_or(RegistryError::AlreadyInstalled)
    }

    /// The installed registry, if any.
    pub fn global() -> Option<&'static Registry> {
        GLOBAL.get()
    }
}

fn collect<'a>(command: &'a CommandDef, commands: &mut BTreeMap<String, &'a CommandDef>) {
    commands.insert(command.id(), command);
    for sub in &command.subcommands {
        collect(sub, commands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::FlagDef;
    use crate::context::Context;

    fn values_of(action: Action) -> Vec<String> {
        action
            .invoke(&Context::default())
            .values
            .into_iter()
            .map(|v| v.value)
            .collect()
    }

    fn tree() -> CommandDef {
        CommandDef::new("demo")
            .flag(FlagDef::value("config").persistent())
            .subcommand(CommandDef::new("action").flag(FlagDef::value("flag")))
    }

    #[test]
    fn resolves_flag_bindings() {
        let root = tree();
        let action = root.find_subcommand("action").unwrap();

        let mut builder = Registry::builder();
        builder
            .command(action)
            .flag("flag", Action::values(["a", "b"]));
        builder
            .command(&root)
            .flags(ActionMap::from([("config".to_string(), Action::values(["c"]))]));
        let registry = builder.build();

        let chain = [&root, action];
        assert_eq!(values_of(registry.resolve(&chain, Slot::Flag("flag"))), vec!["a", "b"]);
        // persistent flag bound on the root
        assert_eq!(values_of(registry.resolve(&chain, Slot::Flag("config"))), vec!["c"]);
        assert!(values_of(registry.resolve(&chain, Slot::Flag("other"))).is_empty());
    }

    #[test]
    fn exact_positional_beats_any() {
        let root = tree();
        let mut builder = Registry::builder();
        builder
            .command(&root)
            .positional([Action::values(["pos1"]), Action::values(["pos2"])])
            .positional_any(Action::values(["any"]))
            .dash([Action::values(["dash1"])])
            .dash_any(Action::values(["dash-any"]));
        let registry = builder.build();

        let chain = [&root];
        assert_eq!(values_of(registry.resolve(&chain, Slot::Positional(0))), vec!["pos1"]);
        assert_eq!(values_of(registry.resolve(&chain, Slot::Positional(1))), vec!["pos2"]);
        assert_eq!(values_of(registry.resolve(&chain, Slot::Positional(2))), vec!["any"]);
        assert_eq!(values_of(registry.resolve(&chain, Slot::Dash(0))), vec!["dash1"]);
        assert_eq!(values_of(registry.resolve(&chain, Slot::Dash(5))), vec!["dash-any"]);
    }

    #[test]
    fn unbound_command_completes_nothing() {
        let root = tree();
        let registry = Registry::builder().build();
        let invoked = registry
            .resolve(&[&root], Slot::Positional(0))
            .invoke(&Context::default());
        assert!(invoked.is_empty());
    }

    #[test]
    fn check_reports_unknown_flags() {
        let root = tree();
        let action = root.find_subcommand("action").unwrap();

        let mut builder = Registry::builder();
        builder.command(action).flag("flag", Action::values(["a"]));
        assert!(builder.build().check(&root).is_empty());

        let mut builder = Registry::builder();
        builder
            .command(action)
            .flag("flag", Action::values(["a"]))
            .flag("unknown-flag", Action::values(["b"]));
        assert_eq!(
            builder.build().check(&root),
            vec![RegistryError::UnknownFlag {
                command: "demo action".to_string(),
                flag: "unknown-flag".to_string(),
            }]
        );
    }

    #[test]
    fn check_reports_unknown_commands() {
        let root = tree();
        let stray = CommandDef::new("stray");

        let mut builder = Registry::builder();
        builder.command(&stray).positional_any(Action::values(["x"]));
        assert_eq!(
            builder.build().check(&root),
            vec![RegistryError::UnknownCommand {
                command: "stray".to_string(),
            }]
        );
    }

    #[test]
    fn install_succeeds_only_once() {
        let first = Registry::builder().build().install();
        assert!(first.is_ok());
        assert!(Registry::global().is_some());

        let second = Registry::builder().build().install();
        assert_eq!(second.unwrap_err(), RegistryError::AlreadyInstalled);
    }
}
