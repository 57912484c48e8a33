//! Resolver: flattens an action tree against one context.

use std::collections::{HashMap, HashSet};

use crate::action::multipart::next_segments;
use crate::action::{Action, Callback, CommandLine, InvokedAction};
use crate::context::Context;
use crate::export::Export;

/// One resolution pass. Callbacks are invoked at most once per pass.
///
/// Callbacks are memoized by address, so every action a callback returns
/// stays alive until the pass ends and no address is reused within it.
pub(crate) struct Resolver<'c> {
    context: &'c Context,
    memo: HashMap<usize, InvokedAction>,
    active: HashSet<usize>,
    produced: Vec<Action>,
}

impl<'c> Resolver<'c> {
    pub(crate) fn new(context: &'c Context) -> Self {
        Self {
            context,
            memo: HashMap::new(),
            active: HashSet::new(),
            produced: Vec::new(),
        }
    }

    pub(crate) fn resolve(&mut self, action: &Action) -> InvokedAction {
        match action {
            Action::Values(values) => InvokedAction::from_values(values.clone()),
            Action::Message(message) => InvokedAction::message(message.clone()),
            Action::MultiParts { separator, values } => {
                next_segments(&self.context.value, *separator, values)
            }
            Action::Callback(callback) => self.callback(callback),
            Action::Execute(line) => self.execute(line),
            Action::Batch(actions) => {
                let mut invoked = InvokedAction::default();
                for action in actions {
                    invoked.merge(self.resolve(action));
                }
                invoked
            }
            Action::Modified(inner, modifier) => modifier.apply(self.resolve(inner)),
            Action::Resolved(invoked) => invoked.clone(),
        }
    }

    fn callback(&mut self, callback: &Callback) -> InvokedAction {
        let id = callback.id();
        if let Some(invoked) = self.memo.get(&id) {
            return invoked.clone();
        }
        if !self.active.insert(id) {
            tracing::warn!("callback re-entered itself during resolution");
            return InvokedAction::message("recursive completion callback");
        }

        let next = callback.call(self.context);
        let invoked = self.resolve(&next);
        self.produced.push(next);

        self.active.remove(&id);
        self.memo.insert(id, invoked.clone());
        invoked
    }

    fn execute(&mut self, line: &CommandLine) -> InvokedAction {
        let output = match self.context.command(&line.program, &line.args) {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(program = %line.program, error = %err, "execute failed");
                return InvokedAction::message(err.to_string());
            }
        };

        match Export::parse(&output) {
            Ok(export) => export.into(),
            Err(err) => {
                tracing::debug!(
                    program = %line.program,
                    error = %err,
                    "execute returned malformed payload"
                );
                InvokedAction::message(err.to_string())
            }
        }
    }
}
