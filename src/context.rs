//! Invocation context: the state of one completion request.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors running an external command.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' failed ({status}): {stderr}")]
    Status {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("no mocked reply for {call}")]
    Unmocked { call: String },
}

/// Canned replies for external commands, handed to a child invocation
/// through the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mock {
    /// Working directory the child should complete in.
    pub dir: String,
    /// JSON-encoded argv → captured stdout.
    pub replies: BTreeMap<String, String>,
}

impl Mock {
    /// Key for a call: the JSON array `[program, args...]`.
    pub fn key(program: &str, args: &[String]) -> String {
        let mut call = Vec::with_capacity(args.len() + 1);
        call.push(program);
        call.extend(args.iter().map(String::as_str));
        serde_json::to_string(&call).unwrap_or_default()
    }

    pub fn reply(&self, program: &str, args: &[String]) -> Option<&str> {
        self.replies
            .get(&Self::key(program, args))
            .map(String::as_str)
    }
}

/// State of a single completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Tokens preceding the current word (program name excluded).
    pub args: Vec<String>,
    /// The partial word being completed.
    pub value: String,
    /// Environment for spawned commands, applied on top of the inherited one.
    pub env: BTreeMap<String, String>,
    /// Working directory; empty means the process's own.
    pub dir: PathBuf,
    /// Replies substituted for external commands.
    pub mock: Option<Mock>,
}

impl Context {
    /// Split `tokens` into prior args and the current word (the last token).
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let value = args.pop().unwrap_or_default();
        Self {
            args,
            value,
            ..Self::default()
        }
    }

    /// Like [`Context::new`], seeded with this process's environment and directory.
    pub fn from_process<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut context = Self::new(tokens);
        context.env = std::env::vars().collect();
        context.dir = std::env::current_dir().unwrap_or_default();
        context
    }

    pub fn setenv(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }

    pub fn getenv(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Resolve `path` against the context directory.
    pub fn abs(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() || self.dir.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.dir.join(path)
        }
    }

    /// Resolve a system file such as `/etc/passwd`.
    ///
    /// Under a mock, absolute paths are looked up inside the mock directory.
    pub fn system_file(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.mock {
            Some(mock) if path.is_absolute() && !mock.dir.is_empty() => {
                let relative = path.strip_prefix("/").unwrap_or(path);
                Path::new(&mock.dir).join(relative)
            }
            _ => self.abs(path),
        }
    }

    /// Run `program` synchronously and capture its stdout.
    ///
    /// Under a mock only mocked calls succeed, so sandboxed runs never
    /// reach real commands.
    pub fn command(&self, program: &str, args: &[String]) -> Result<Vec<u8>, ExecError> {
        if let Some(mock) = &self.mock {
            return match mock.reply(program, args) {
                Some(reply) => {
                    tracing::debug!(program, ?args, "using mocked reply");
                    Ok(reply.as_bytes().to_vec())
                }
                None => Err(ExecError::Unmocked {
                    call: Mock::key(program, args),
                }),
            };
        }

        spawn(program, args, &self.env, &self.dir)
    }
}

/// Spawn `program` with `env` layered over the inherited environment.
pub(crate) fn spawn(
    program: &str,
    args: &[String],
    env: &BTreeMap<String, String>,
    dir: &Path,
) -> Result<Vec<u8>, ExecError> {
    tracing::debug!(program, ?args, dir = %dir.display(), "spawning external command");

    let mut command = Command::new(program);
    command
        .args(args)
        .envs(env)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if !dir.as_os_str().is_empty() {
        command.current_dir(dir);
    }

    let output = command.output().map_err(|source| ExecError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExecError::Status {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: stderr.lines().next().unwrap_or_default().to_string(),
        });
    }

    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_splits_current_word() {
        let context = Context::new(["action", "--values", "ex"]);
        assert_eq!(context.args, vec!["action", "--values"]);
        assert_eq!(context.value, "ex");

        let empty = Context::new(Vec::<String>::new());
        assert!(empty.args.is_empty());
        assert_eq!(empty.value, "");
    }

    #[test]
    fn setenv_and_getenv() {
        let mut context = Context::default();
        context.setenv("KEY", "value");
        assert_eq!(context.getenv("KEY"), Some("value"));
        assert_eq!(context.getenv("MISSING"), None);
    }

    #[test]
    fn abs_joins_relative_paths() {
        let context = Context {
            dir: PathBuf::from("/tmp/sandbox"),
            ..Context::default()
        };
        assert_eq!(context.abs("sub"), PathBuf::from("/tmp/sandbox/sub"));
        assert_eq!(context.abs("/etc"), PathBuf::from("/etc"));
    }

    #[test]
    fn system_files_move_into_the_mock_directory() {
        let mut context = Context {
            dir: PathBuf::from("/work"),
            ..Context::default()
        };
        assert_eq!(context.system_file("/etc/hosts"), PathBuf::from("/etc/hosts"));
        assert_eq!(context.system_file("bin"), PathBuf::from("/work/bin"));

        context.mock = Some(Mock {
            dir: "/tmp/sandbox".to_string(),
            ..Mock::default()
        });
        assert_eq!(
            context.system_file("/etc/hosts"),
            PathBuf::from("/tmp/sandbox/etc/hosts")
        );
        assert_eq!(context.system_file("bin"), PathBuf::from("/work/bin"));
    }

    #[test]
    fn mock_key_is_json_argv() {
        let key = Mock::key("git", &["branch".to_string()]);
        assert_eq!(key, r#"["git","branch"]"#);
    }

    #[test]
    fn mocked_command_returns_reply() {
        let mut mock = Mock::default();
        mock.replies
            .insert(Mock::key("git", &["branch".to_string()]), "main\n".to_string());
        let context = Context {
            mock: Some(mock),
            ..Context::default()
        };

        let output = context.command("git", &["branch".to_string()]).unwrap();
        assert_eq!(output, b"main\n");

        let err = context.command("git", &["tag".to_string()]).unwrap_err();
        assert!(matches!(err, ExecError::Unmocked { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn command_captures_stdout_and_env() {
        let mut context = Context::default();
        context.setenv("COMPLINE_TEST_VALUE", "from-env");
        let output = context
            .command("sh", &["-c".to_string(), "printf %s \"$COMPLINE_TEST_VALUE\"".to_string()])
            .unwrap();
        assert_eq!(output, b"from-env");
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_status() {
        let context = Context::default();
        let err = context
            .command("sh", &["-c".to_string(), "echo broken >&2; exit 3".to_string()])
            .unwrap_err();
        match err {
            ExecError::Status { stderr, .. } => assert_eq!(stderr, "broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let context = Context::default();
        let err = context
            .command("compline-definitely-missing-program", &[])
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
