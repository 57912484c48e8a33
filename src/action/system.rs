//! Candidates read from the host: accounts, hosts, interfaces, executables.
//!
//! All lookups go through [`Context::system_file`], so a sandbox can
//! provide its own `/etc/passwd` and friends.

use std::collections::BTreeMap;
use std::path::Path;

use crate::action::{Action, RawValue};
use crate::context::Context;

const PASSWD: &str = "/etc/passwd";
const GROUP: &str = "/etc/group";
const HOSTS: &str = "/etc/hosts";
const NET: &str = "/sys/class/net";

fn read(context: &Context, path: &str) -> Result<String, Action> {
    std::fs::read_to_string(context.system_file(path)).map_err(|err| {
        tracing::debug!(path, error = %err, "system file unreadable");
        Action::message(format!("{}: {}", path, err))
    })
}

/// Records of a colon-separated database, comments skipped.
fn records(content: &str) -> impl Iterator<Item = Vec<&str>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.split(':').collect())
}

pub(super) fn users(context: &Context) -> Action {
    let content = match read(context, PASSWD) {
        Ok(content) => content,
        Err(message) => return message,
    };
    Action::Values(
        records(&content)
            .filter(|fields| !fields[0].is_empty())
            .map(|fields| {
                // name:password:uid:gid:gecos:home:shell
                let gecos = fields.get(4).copied().unwrap_or_default();
                let full_name = gecos.split(',').next().unwrap_or_default();
                RawValue::new(fields[0]).description(full_name)
            })
            .collect(),
    )
}

pub(super) fn groups(context: &Context) -> Action {
    let content = match read(context, GROUP) {
        Ok(content) => content,
        Err(message) => return message,
    };
    Action::Values(
        records(&content)
            .filter(|fields| !fields[0].is_empty())
            .map(|fields| {
                let members = fields.get(3).copied().unwrap_or_default();
                RawValue::new(fields[0]).description(members)
            })
            .collect(),
    )
}

pub(super) fn hosts(context: &Context) -> Action {
    let content = match read(context, HOSTS) {
        Ok(content) => content,
        Err(message) => return message,
    };

    // first address listed for a name wins
    let mut names: BTreeMap<&str, &str> = BTreeMap::new();
    for line in content.lines() {
        let line = line.split('#').next().unwrap_or_default();
        let mut fields = line.split_whitespace();
        let Some(address) = fields.next() else {
            continue;
        };
        for name in fields {
            names.entry(name).or_insert(address);
        }
    }

    Action::Values(
        names
            .into_iter()
            .map(|(name, address)| RawValue::new(name).description(address))
            .collect(),
    )
}

pub(super) fn net_interfaces(context: &Context) -> Action {
    let entries = match std::fs::read_dir(context.system_file(NET)) {
        Ok(entries) => entries,
        Err(err) => return Action::message(format!("{}: {}", NET, err)),
    };
    let mut names: Vec<String> = entries
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Action::values(names)
}

/// Executables found in the `PATH` of the context, ending with `suffix`.
pub(super) fn path_files(context: &Context, suffix: &str) -> Action {
    let Some(path) = context.getenv("PATH") else {
        return Action::message("PATH is not set");
    };

    // earlier PATH entries shadow later ones
    let mut found: BTreeMap<String, String> = BTreeMap::new();
    for dir in std::env::split_paths(path) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(context.system_file(&dir)) else {
            continue;
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.ends_with(suffix) || found.contains_key(&name) {
                continue;
            }
            if is_executable(&entry.path()) {
                found.insert(name, dir.display().to_string());
            }
        }
    }

    Action::Values(
        found
            .into_iter()
            .map(|(name, dir)| RawValue::new(name).description(dir))
            .collect(),
    )
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
