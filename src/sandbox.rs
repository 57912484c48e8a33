//! Sandbox: run completions against scratch files and canned command
//! output, then compare exported payloads.
//!
//! ```text
//! Sandbox { temp dir, env, mocked replies } → run(tokens) → Run::expect(Action)
//! ```
//!
//! Two targets: a completion function in this process, or a program asked
//! through its hidden subcommand with the mocks passed in `COMPLINE_SANDBOX`.
//! Payloads are compared ordered by value.

use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path};

use tempfile::TempDir;

use crate::action::{Action, InvokedAction};
use crate::completer::Completer;
use crate::context::{Context, Mock};
use crate::export::{Export, Invocation, Order};

enum Target<'a> {
    InProcess(Box<dyn Fn(&Context) -> InvokedAction + 'a>),
    Program(Invocation),
}

/// Scratch environment for one completion test.
pub struct Sandbox<'a> {
    target: Target<'a>,
    env: BTreeMap<String, String>,
    mock: Mock,
    dir: Option<TempDir>,
    keep: bool,
}

impl<'a> Sandbox<'a> {
    fn new(target: Target<'a>) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("compline-sandbox_")
            .tempdir()?;
        let mock = Mock {
            dir: dir.path().to_string_lossy().into_owned(),
            replies: BTreeMap::new(),
        };
        Ok(Self {
            target,
            env: BTreeMap::new(),
            mock,
            dir: Some(dir),
            keep: false,
        })
    }

    /// Complete with `complete` in this process.
    pub fn in_process<F>(complete: F) -> io::Result<Self>
    where
        F: Fn(&Context) -> InvokedAction + 'a,
    {
        Self::new(Target::InProcess(Box::new(complete)))
    }

    pub fn completer(completer: &'a Completer<'_>) -> io::Result<Self> {
        Self::in_process(move |context| completer.complete(context))
    }

    /// Complete by re-invoking a program.
    pub fn program(invocation: Invocation) -> io::Result<Self> {
        Self::new(Target::Program(invocation))
    }

    pub fn dir(&self) -> &Path {
        Path::new(&self.mock.dir)
    }

    /// Leave the sandbox directory behind for inspection.
    pub fn keep(&mut self) -> &mut Self {
        self.keep = true;
        self
    }

    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Create files (and their parent directories) inside the sandbox.
    pub fn files(&mut self, files: &[(&str, &str)]) -> io::Result<&mut Self> {
        for (name, content) in files {
            let relative = Path::new(name);
            let escapes = relative.is_absolute()
                || relative
                    .components()
                    .any(|c| matches!(c, Component::ParentDir));
            if escapes {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid sandbox file name: {}", name),
                ));
            }

            let path = self.dir().join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, content)?;
        }
        Ok(self)
    }

    /// Mock the external command `args` (program first).
    pub fn reply<I, S>(&mut self, args: I) -> Reply<'_, 'a>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = args.into_iter().map(Into::into).collect();
        let program = if args.is_empty() {
            String::new()
        } else {
            args.remove(0)
        };
        Reply {
            call: Mock::key(&program, &args),
            sandbox: self,
        }
    }

    /// Context for `tokens` (the last one is the current word) inside the sandbox.
    pub fn context<I, S>(&self, tokens: I) -> Context
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut context = Context::new(tokens);
        for (key, value) in &self.env {
            context.setenv(key.clone(), value.clone());
        }
        context.dir = self.dir().to_path_buf();
        context.mock = Some(self.mock.clone());
        context
    }

    pub fn run<I, S>(&self, tokens: I) -> Run
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let context = self.context(tokens);
        let actual = match &self.target {
            Target::InProcess(complete) => complete(&context),
            Target::Program(invocation) => invocation
                .run(&context)
                .unwrap_or_else(|err| InvokedAction::message(err.to_string())),
        };
        Run { context, actual }
    }
}

impl Drop for Sandbox<'_> {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if self.keep {
                let path = dir.keep();
                tracing::info!(dir = %path.display(), "keeping sandbox directory");
            }
        }
    }
}

/// Pending mock for one call.
pub struct Reply<'s, 'a> {
    sandbox: &'s mut Sandbox<'a>,
    call: String,
}

impl Reply<'_, '_> {
    /// Output the mocked command prints.
    pub fn with(self, output: impl Into<String>) {
        self.sandbox.mock.replies.insert(self.call, output.into());
    }
}

/// Outcome of one sandboxed completion.
#[derive(Debug, Clone)]
pub struct Run {
    context: Context,
    actual: InvokedAction,
}

impl Run {
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn invoked(&self) -> &InvokedAction {
        &self.actual
    }

    /// Pretty exported payload, filtered by the current word and ordered by value.
    pub fn output(&self) -> String {
        self.export(self.actual.clone())
    }

    /// Assert the run produced what `expected` resolves to in the same context.
    #[track_caller]
    pub fn expect(&self, expected: Action) {
        let expected = self.export(expected.invoke(&self.context));
        assert_eq!(
            expected,
            self.output(),
            "completion of {:?} after {:?}",
            self.context.value,
            self.context.args
        );
    }

    fn export(&self, invoked: InvokedAction) -> String {
        Export::new(invoked, &self.context.value, Order::Value).to_json_pretty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_process_completion_sees_sandbox_files() {
        let mut sandbox = Sandbox::in_process(|context| Action::files(".rs").invoke(context)).unwrap();
        sandbox
            .files(&[("main.rs", ""), ("src/lib.rs", ""), ("notes.md", "")])
            .unwrap();

        sandbox.run([""]).expect(Action::batch([
            Action::values(["main.rs"]),
            Action::Values(vec![crate::action::RawValue::new("src/")
                .style("blue")
                .no_space(true)]),
        ]));
        sandbox
            .run(["src/"])
            .expect(Action::Values(vec![
                crate::action::RawValue::new("src/lib.rs").display("lib.rs")
            ]));
    }

    #[test]
    fn mocked_reply_replaces_command() {
        let mut sandbox = Sandbox::in_process(|context| {
            Action::exec_command("git", ["branch"], |output| {
                Action::values(String::from_utf8_lossy(output).lines())
            })
            .invoke(context)
        })
        .unwrap();
        sandbox.reply(["git", "branch"]).with("main\nfeature\n");

        sandbox.run([""]).expect(Action::values(["feature", "main"]));
        sandbox.run(["ma"]).expect(Action::values(["main"]));
    }

    #[test]
    fn env_is_passed_through_context() {
        let mut sandbox = Sandbox::in_process(|context| {
            Action::values(context.getenv("GREETING").map(str::to_string)).invoke(context)
        })
        .unwrap();
        sandbox.env("GREETING", "hello");
        sandbox.run([""]).expect(Action::values(["hello"]));
    }

    #[test]
    fn output_is_ordered_by_value() {
        let sandbox = Sandbox::in_process(|_| {
            InvokedAction::from_values(vec![
                crate::action::RawValue::new("b").display("a"),
                crate::action::RawValue::new("a").display("b"),
            ])
        })
        .unwrap();
        let output = sandbox.run([""]).output();
        let export = Export::parse(output.as_bytes()).unwrap();
        assert_eq!(export.values[0].value, "a");
    }

    #[test]
    fn files_outside_sandbox_are_rejected() {
        let mut sandbox = Sandbox::in_process(|_| InvokedAction::default()).unwrap();
        match sandbox.files(&[("../escape.txt", "")]) {
            Err(err) => assert_eq!(err.kind(), io::ErrorKind::InvalidInput),
            Ok(_) => panic!("parent directory accepted"),
        }
        assert!(sandbox.files(&[("/etc/passwd", "")]).is_err());
    }

    #[test]
    fn directory_is_removed_unless_kept() {
        let sandbox = Sandbox::in_process(|_| InvokedAction::default()).unwrap();
        let removed = sandbox.dir().to_path_buf();
        drop(sandbox);
        assert!(!removed.exists());

        let mut sandbox = Sandbox::in_process(|_| InvokedAction::default()).unwrap();
        sandbox.keep();
        let kept = sandbox.dir().to_path_buf();
        drop(sandbox);
        assert!(kept.exists());
        std::fs::remove_dir_all(kept).unwrap();
    }

    #[test]
    #[should_panic(expected = "completion of")]
    fn expect_fails_on_mismatch() {
        let sandbox = Sandbox::in_process(|_| InvokedAction::default()).unwrap();
        sandbox.run([""]).expect(Action::values(["missing"]));
    }
}
