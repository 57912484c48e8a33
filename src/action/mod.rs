//! Actions: composable descriptions of how to produce completion candidates.
//!
//! ```text
//! Action tree → invoke(Context) → InvokedAction → filter / sort → renderer
//! ```
//!
//! Every action resolves: failures end up as messages, never as errors.

mod invoke;
mod multipart;
mod system;
mod value;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use value::{InvokedAction, Meta, RawValue};

use crate::context::Context;
use crate::export::Export;

/// Actions bound to flag names, as passed to the registry.
pub type ActionMap = BTreeMap<String, Action>;

/// Deferred action computed from the context at completion time.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(&Context) -> Action + Send + Sync>);

impl Callback {
    /// Identity used to memoize a callback within one resolution.
    fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    fn call(&self, context: &Context) -> Action {
        (self.0)(context)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:#x})", self.id())
    }
}

/// External command whose stdout is an exported payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

/// Post-processing applied to a resolved action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// No trailing space after any candidate.
    NoSpace,
    /// Style for candidates that have none yet.
    Style(String),
    /// Usage hint unless one is already set.
    Usage(String),
    /// Prepend to every inserted value (display is kept).
    Prefix(String),
}

impl Modifier {
    fn apply(&self, mut invoked: InvokedAction) -> InvokedAction {
        match self {
            Modifier::NoSpace => {
                for value in &mut invoked.values {
                    value.no_space = true;
                }
            }
            Modifier::Style(style) => {
                for value in invoked.values.iter_mut().filter(|v| v.style.is_empty()) {
                    value.style = style.clone();
                }
            }
            Modifier::Usage(usage) => {
                if invoked.meta.usage.is_empty() {
                    invoked.meta.usage = usage.clone();
                }
            }
            Modifier::Prefix(prefix) => {
                for value in &mut invoked.values {
                    value.value.insert_str(0, prefix);
                }
            }
        }
        invoked
    }
}

/// A way to produce completion candidates.
#[derive(Debug, Clone)]
pub enum Action {
    /// Fixed candidates.
    Values(Vec<RawValue>),
    /// Help text shown where nothing can be completed.
    Message(String),
    /// Full values split on a separator, completed segment by segment.
    MultiParts {
        separator: char,
        values: Vec<String>,
    },
    /// Computed from the context at completion time.
    Callback(Callback),
    /// Run a command and import its exported payload.
    Execute(CommandLine),
    /// Sibling actions, resolved in order and concatenated.
    Batch(Vec<Action>),
    /// An action with post-processing.
    Modified(Box<Action>, Modifier),
    /// Already resolved (e.g., imported from another process).
    Resolved(InvokedAction),
}

impl Default for Action {
    fn default() -> Self {
        Action::Values(Vec::new())
    }
}

impl From<InvokedAction> for Action {
    fn from(invoked: InvokedAction) -> Self {
        Action::Resolved(invoked)
    }
}

impl Action {
    /// Completes arbitrary keywords.
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Values(values.into_iter().map(RawValue::new).collect())
    }

    /// Completes keywords with a description each.
    pub fn values_described<I, S, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: Into<String>,
        D: Into<String>,
    {
        Action::Values(
            pairs
                .into_iter()
                .map(|(value, description)| RawValue::new(value).description(description))
                .collect(),
        )
    }

    /// Completes keywords with a style each.
    pub fn styled_values<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Action::Values(
            pairs
                .into_iter()
                .map(|(value, style)| RawValue::new(value).style(style))
                .collect(),
        )
    }

    /// Completes `true` / `false`.
    pub fn bool() -> Self {
        Action::values(["true", "false"])
    }

    pub fn message(message: impl Into<String>) -> Self {
        Action::Message(message.into())
    }

    /// Completes values segment by segment, split on `separator`.
    pub fn multi_parts<I, S>(separator: char, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::MultiParts {
            separator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn callback<F>(callback: F) -> Self
    where
        F: Fn(&Context) -> Action + Send + Sync + 'static,
    {
        Action::Callback(Callback(Arc::new(callback)))
    }

    /// Runs `program` and imports its stdout as an exported payload.
    pub fn execute<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Action::Execute(CommandLine {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        })
    }

    /// Runs `program` and turns its stdout into an action.
    pub fn exec_command<I, S, F>(program: impl Into<String>, args: I, on_output: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&[u8]) -> Action + Send + Sync + 'static,
    {
        let program = program.into();
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        Action::callback(move |context| match context.command(&program, &args) {
            Ok(output) => on_output(&output),
            Err(err) => Action::message(err.to_string()),
        })
    }

    /// Imports an exported payload; malformed input becomes a message.
    pub fn import(output: &[u8]) -> Self {
        match Export::parse(output) {
            Ok(export) => Action::Resolved(export.into()),
            Err(err) => Action::message(err.to_string()),
        }
    }

    /// Completes entries of the context directory; files must end with `suffix`.
    pub fn files(suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        Action::callback(move |context| list_files(context, &suffix))
    }

    /// Completes executables found in `PATH`; names must end with `suffix`.
    pub fn path_files(suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        Action::callback(move |context| system::path_files(context, &suffix))
    }

    /// Completes user names from `/etc/passwd`.
    pub fn users() -> Self {
        Action::callback(system::users)
    }

    /// Completes group names from `/etc/group`.
    pub fn groups() -> Self {
        Action::callback(system::groups)
    }

    /// Completes host names from `/etc/hosts`.
    pub fn hosts() -> Self {
        Action::callback(system::hosts)
    }

    /// Completes network interface names.
    pub fn net_interfaces() -> Self {
        Action::callback(system::net_interfaces)
    }

    pub fn batch<I>(actions: I) -> Self
    where
        I: IntoIterator<Item = Action>,
    {
        Action::Batch(actions.into_iter().collect())
    }

    pub fn no_space(self) -> Self {
        Action::Modified(Box::new(self), Modifier::NoSpace)
    }

    pub fn style(self, style: impl Into<String>) -> Self {
        Action::Modified(Box::new(self), Modifier::Style(style.into()))
    }

    pub fn usage(self, usage: impl Into<String>) -> Self {
        Action::Modified(Box::new(self), Modifier::Usage(usage.into()))
    }

    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        Action::Modified(Box::new(self), Modifier::Prefix(prefix.into()))
    }

    /// Resolve against `context` into concrete candidates.
    pub fn invoke(&self, context: &Context) -> InvokedAction {
        invoke::Resolver::new(context).resolve(self)
    }
}

fn list_files(context: &Context, suffix: &str) -> Action {
    let (dir, name) = match context.value.rfind('/') {
        Some(index) => context.value.split_at(index + 1),
        None => ("", context.value.as_str()),
    };
    let show_hidden = name.starts_with('.');

    let entries = match std::fs::read_dir(context.abs(dir)) {
        Ok(entries) => entries,
        Err(err) => return Action::message(format!("{}: {}", dir, err)),
    };

    let mut values = Vec::new();
    for entry in entries.flatten() {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') && !show_hidden {
            continue;
        }
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if is_dir {
            let display = format!("{}/", file_name);
            values.push(
                RawValue::new(format!("{}{}", dir, display))
                    .display(display)
                    .style("blue")
                    .no_space(true),
            );
        } else if file_name.ends_with(suffix) {
            values.push(RawValue::new(format!("{}{}", dir, file_name)).display(file_name));
        }
    }
    values.sort_by(|a, b| a.value.cmp(&b.value));
    Action::Values(values)
}
