//! Token classifier: raw token → flag, shorthand cluster or plain value.

use crate::command::{FlagDef, FlagSet};

/// What a single raw token is, relative to a command's declared flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRole<'a> {
    /// `--name` or `--name=value` (or `-name` for non-POSIX commands).
    LongFlag {
        flag: &'a FlagDef,
        value: Option<String>,
    },
    /// `-abc`, `-fvalue`, `-o=value`: every shorthand in the series in order,
    /// the last one possibly carrying an inline value.
    ShortCluster {
        flags: Vec<&'a FlagDef>,
        value: Option<String>,
    },
    /// Looks like a flag but matches nothing declared.
    UnknownFlag,
    /// Not a flag at all.
    PlainValue,
}

impl<'a> TokenRole<'a> {
    /// The flag that owns a possible value: the long flag or the last shorthand.
    pub fn flag(&self) -> Option<&'a FlagDef> {
        match self {
            TokenRole::LongFlag { flag, .. } => Some(*flag),
            TokenRole::ShortCluster { flags, .. } => flags.last().copied(),
            TokenRole::UnknownFlag | TokenRole::PlainValue => None,
        }
    }

    /// Every flag set by this token.
    pub fn flags(&self) -> Vec<&'a FlagDef> {
        match self {
            TokenRole::LongFlag { flag, .. } => vec![*flag],
            TokenRole::ShortCluster { flags, .. } => flags.clone(),
            TokenRole::UnknownFlag | TokenRole::PlainValue => Vec::new(),
        }
    }

    /// Inline value carried by the token, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            TokenRole::LongFlag { value, .. } | TokenRole::ShortCluster { value, .. } => {
                value.as_deref()
            }
            TokenRole::UnknownFlag | TokenRole::PlainValue => None,
        }
    }
}

/// Classify a raw token against the flag set.
pub fn classify<'a>(flags: &FlagSet<'a>, token: &str) -> TokenRole<'a> {
    if !token.starts_with('-') || token == "-" || token == "--" {
        return TokenRole::PlainValue;
    }

    if is_shorthand_series(flags, token) {
        if let Some(role) = shorthand_lookup(flags, token) {
            return role;
        }
    }

    lookup_name(flags, token)
}

/// A single dash, at least one character after it, and that character is a
/// known shorthand. Never true for non-POSIX commands.
fn is_shorthand_series(flags: &FlagSet<'_>, token: &str) -> bool {
    if !flags.is_posix() || token.starts_with("--") {
        return false;
    }
    let Some(body) = token.strip_prefix('-') else {
        return false;
    };
    body.chars()
        .next()
        .is_some_and(|c| flags.shorthand_lookup(c).is_some())
}

/// Walk the shorthands of a series. `None` when a character matches no
/// shorthand, in which case the token is looked up by name instead.
fn shorthand_lookup<'a>(flags: &FlagSet<'a>, token: &str) -> Option<TokenRole<'a>> {
    let body = &token[1..];
    let mut series = Vec::new();

    for (index, c) in body.char_indices() {
        let flag = flags.shorthand_lookup(c)?;
        series.push(flag);
        let rest = &body[index + c.len_utf8()..];

        if flag.is_optarg() {
            if let Some(value) = rest.strip_prefix(flag.optarg_delimiter) {
                return Some(TokenRole::ShortCluster {
                    flags: series,
                    value: Some(value.to_string()),
                });
            }
        }

        if flag.takes_value() {
            let value = (!rest.is_empty())
                .then(|| rest.strip_prefix('=').unwrap_or(rest).to_string());
            return Some(TokenRole::ShortCluster {
                flags: series,
                value,
            });
        }
    }

    Some(TokenRole::ShortCluster {
        flags: series,
        value: None,
    })
}

/// Exact name lookup: `--long[=value]`, `-s[=value]`, and `-long[=value]`
/// for non-POSIX commands.
fn lookup_name<'a>(flags: &FlagSet<'a>, token: &str) -> TokenRole<'a> {
    let (name, value) = match token.split_once('=') {
        Some((name, value)) => (name, Some(value.to_string())),
        None => (token, None),
    };

    if let Some(long) = name.strip_prefix("--") {
        return match flags.lookup(long) {
            Some(flag) => TokenRole::LongFlag { flag, value },
            None => TokenRole::UnknownFlag,
        };
    }

    let Some(short) = name.strip_prefix('-') else {
        return TokenRole::PlainValue;
    };

    if !flags.is_posix() {
        if let Some(flag) = flags.lookup(short) {
            return TokenRole::LongFlag { flag, value };
        }
    }

    let mut chars = short.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => match flags.shorthand_lookup(c) {
            Some(flag) => TokenRole::ShortCluster {
                flags: vec![flag],
                value,
            },
            None => TokenRole::UnknownFlag,
        },
        _ => TokenRole::UnknownFlag,
    }
}
