//! Re-invocation: ask a program (usually ourselves) for completions
//! through its hidden subcommand and import the answer.

use std::path::PathBuf;

use thiserror::Error;

use crate::action::{Action, InvokedAction};
use crate::context::{spawn, Context, ExecError};
use crate::export::{Export, ImportError};

/// Reserved subcommand answering completion requests.
pub const HIDDEN_SUBCOMMAND: &str = "_compline";

/// Environment variable carrying the serialized [`Mock`](crate::context::Mock) bundle.
pub const SANDBOX_ENV: &str = "COMPLINE_SANDBOX";

/// Errors of a single re-invocation.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("failed to encode sandbox state: {0}")]
    Encode(#[source] serde_json::Error),
}

/// How to reach the program answering completion requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    /// Arguments placed before the hidden subcommand (e.g., `run --quiet --`).
    leading_args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// `<leading…> _compline export <args…> <current word>`
    pub fn request_args(&self, context: &Context) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push(HIDDEN_SUBCOMMAND.to_string());
        args.push("export".to_string());
        args.extend(context.args.iter().cloned());
        args.push(context.value.clone());
        args
    }

    /// Run the request and import the payload.
    pub fn run(&self, context: &Context) -> Result<InvokedAction, InvocationError> {
        let mut env = context.env.clone();
        if let Some(mock) = &context.mock {
            let bundle = serde_json::to_string(mock).map_err(InvocationError::Encode)?;
            env.insert(SANDBOX_ENV.to_string(), bundle);
        }

        let program = self.program.to_string_lossy();
        let output = spawn(&program, &self.request_args(context), &env, &context.dir)?;
        let export = Export::parse(&output)?;
        tracing::debug!(
            program = %program,
            values = export.values.len(),
            "imported completion payload"
        );
        Ok(export.into())
    }

    /// Deferred action performing the request at completion time.
    pub fn action(self) -> Action {
        Action::callback(move |context| match self.run(context) {
            Ok(invoked) => Action::Resolved(invoked),
            Err(err) => Action::message(err.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_args_append_tokens_and_current_word() {
        let invocation = Invocation::new("cargo").with_leading_args(["run", "--quiet", "--"]);
        let context = Context::new(["action", "--values", "ex"]);
        assert_eq!(
            invocation.request_args(&context),
            vec!["run", "--quiet", "--", "_compline", "export", "action", "--values", "ex"]
        );
    }

    #[test]
    fn empty_current_word_is_still_passed() {
        let invocation = Invocation::new("demo");
        let context = Context::new(["action", ""]);
        assert_eq!(
            invocation.request_args(&context),
            vec!["_compline", "export", "action", ""]
        );
    }

    #[test]
    fn missing_program_degrades_to_message() {
        let action = Invocation::new("compline-definitely-missing-program").action();
        let invoked = action.invoke(&Context::new([""]));
        assert!(invoked.values.is_empty());
        assert_eq!(invoked.meta.messages.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn child_receives_sandbox_bundle_and_answers() {
        let script = r#"printf '{"values":[{"value":"%s","display":"%s"}]}' "$COMPLINE_SANDBOX_SEEN" "$3""#;
        let invocation = Invocation::new("sh").with_leading_args(["-c", script, "sh"]);

        let mut context = Context::new(["action", "cur"]);
        context.setenv("COMPLINE_SANDBOX_SEEN", "seen");
        context.mock = Some(crate::context::Mock::default());

        let invoked = invocation.run(&context).unwrap();
        assert_eq!(invoked.values[0].value, "seen");
        // $1=_compline $2=export $3=action
        assert_eq!(invoked.values[0].display, "action");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_an_error() {
        let invocation = Invocation::new("sh").with_leading_args(["-c", "exit 1", "sh"]);
        let err = invocation.run(&Context::new([""])).unwrap_err();
        assert!(matches!(err, InvocationError::Exec(ExecError::Status { .. })));
    }
}
