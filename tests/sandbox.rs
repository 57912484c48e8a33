//! Sandboxed completion runs against the demo binary and in-process.

use compline::export::Invocation;
use compline::registry::Registry;
use compline::sandbox::Sandbox;
use compline::{Action, CommandDef, Completer, FlagDef, RawValue};

fn demo() -> Sandbox<'static> {
    let mut sandbox = Sandbox::program(Invocation::new(env!("CARGO_BIN_EXE_compline")))
        .expect("Failed to create sandbox");
    sandbox.env("COMPLINE_CONFIG", "/nonexistent/compline/config.toml");
    sandbox
}

#[test]
fn test_program_static_values() {
    let sandbox = demo();
    sandbox
        .run(["action", "--values", ""])
        .expect(Action::values(["values", "example"]));
    sandbox
        .run(["action", "--values", "ex"])
        .expect(Action::values(["example"]));
}

#[test]
fn test_program_mocked_branches() {
    let mut sandbox = demo();
    sandbox
        .reply(["git", "branch", "--format=%(refname:short)"])
        .with("main\nfeature\n");

    sandbox
        .run(["action", "--branch", ""])
        .expect(Action::values(["main", "feature"]).style("magenta"));
}

#[test]
fn test_program_unmocked_command_is_a_message() {
    let sandbox = demo();
    let run = sandbox.run(["action", "--branch", ""]);
    assert!(run.invoked().values.is_empty());
    assert_eq!(run.invoked().meta.messages.len(), 1);
}

#[test]
fn test_program_files_in_sandbox_dir() {
    let mut sandbox = demo();
    sandbox
        .files(&[("main.rs", "fn main() {}"), ("src/lib.rs", ""), ("README.md", "")])
        .expect("Failed to create files");

    sandbox.run(["action", "--files", ""]).expect(Action::Values(vec![
        RawValue::new("main.rs"),
        RawValue::new("src/").style("blue").no_space(true),
    ]));
}

#[test]
fn test_program_system_files_in_sandbox_dir() {
    let mut sandbox = demo();
    sandbox
        .files(&[
            ("etc/passwd", "root:x:0:0:root:/root:/bin/sh\nalice:x:1000:1000:Alice:/home/alice:/bin/sh\n"),
            ("etc/hosts", "127.0.0.1 localhost\n"),
        ])
        .expect("Failed to create files");

    sandbox
        .run(["action", "--users", "a"])
        .expect(Action::values_described([("alice", "Alice")]));
    sandbox
        .run(["action", "--hosts", ""])
        .expect(Action::values_described([("localhost", "127.0.0.1")]));
}

#[test]
fn test_in_process_completer() {
    let root = CommandDef::new("tool").subcommand(
        CommandDef::new("build")
            .flag(FlagDef::value("target").short('t'))
            .flag(FlagDef::new("release").short('r')),
    );
    let build = root.find_subcommand("build").expect("build subcommand");
    let mut builder = Registry::builder();
    builder
        .command(build)
        .flag("target", Action::values(["x86_64", "aarch64"]))
        .positional_any(Action::files(".toml"));
    let registry = builder.build();
    assert!(registry.check(&root).is_empty());

    let completer = Completer::new(root.clone(), &registry);
    let mut sandbox = Sandbox::completer(&completer).expect("Failed to create sandbox");
    sandbox
        .files(&[("Cargo.toml", ""), ("notes.txt", "")])
        .expect("Failed to create files");

    let run = sandbox.run(["build", "-rt", ""]);
    assert_eq!(run.context().args, vec!["build", "-rt"]);
    assert_eq!(run.context().dir, sandbox.dir());
    run.expect(Action::values(["aarch64", "x86_64"]));
    sandbox
        .run(["build", "-rt=x"])
        .expect(Action::values(["-rt=x86_64"]));
    sandbox
        .run(["build", ""])
        .expect(Action::values(["Cargo.toml"]));
}
