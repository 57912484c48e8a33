//! Command model: the declared flags, positional slots and subcommands
//! that completion is resolved against.
//!
//! ```text
//! CommandDef tree → FlagSet (per chain) → classify / scan
//! ```
//!
//! The engine only ever reads these definitions. A tree can be written by
//! hand or imported from a `clap::Command` (see [`from_clap`]).

mod classifier;
pub mod from_clap;
mod scan;

pub use classifier::{classify, TokenRole};
pub use scan::{scan, Scan};

/// Whether a flag takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagArity {
    /// Boolean flag, no value (e.g., --verbose).
    NoValue,
    /// Requires exactly one value (e.g., --output <FILE>).
    RequiresValue,
    /// Optional value, only ever passed inline (e.g., --color[=WHEN]).
    OptionalValue,
}

/// A single flag definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagDef {
    /// Long name without leading dashes (e.g., "output").
    pub long: String,
    /// Optional shorthand rune (e.g., 'o').
    pub short: Option<char>,
    /// Does it take a value?
    pub arity: FlagArity,
    /// Character separating an optional argument from the flag itself.
    pub optarg_delimiter: char,
    /// Hidden flags are omitted from flag-name candidates.
    pub hidden: bool,
    /// Inherited by every subcommand.
    pub persistent: bool,
    /// May be passed more than once.
    pub repeatable: bool,
    /// Human-readable description.
    pub description: String,
}

impl FlagDef {
    /// Boolean flag.
    pub fn new(long: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            short: None,
            arity: FlagArity::NoValue,
            optarg_delimiter: '=',
            hidden: false,
            persistent: false,
            repeatable: false,
            description: String::new(),
        }
    }

    /// Flag with a mandatory value.
    pub fn value(long: impl Into<String>) -> Self {
        Self {
            arity: FlagArity::RequiresValue,
            ..Self::new(long)
        }
    }

    /// Flag with an optional inline value.
    pub fn optarg(long: impl Into<String>) -> Self {
        Self {
            arity: FlagArity::OptionalValue,
            ..Self::new(long)
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.optarg_delimiter = delimiter;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// A value must follow, inline or as the next token.
    pub fn takes_value(&self) -> bool {
        self.arity == FlagArity::RequiresValue
    }

    /// A value may follow, but only inline after the delimiter.
    pub fn is_optarg(&self) -> bool {
        self.arity == FlagArity::OptionalValue
    }

    /// Whether completion should offer values for this flag at all.
    pub fn accepts_value(&self) -> bool {
        self.arity != FlagArity::NoValue
    }
}

/// A command in the definition tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDef {
    pub name: String,
    /// Names from the root down to this command.
    pub path: Vec<String>,
    pub aliases: Vec<String>,
    pub description: String,
    pub hidden: bool,
    pub flags: Vec<FlagDef>,
    /// Groups of long flag names of which only one may be set.
    pub exclusive_groups: Vec<Vec<String>>,
    pub subcommands: Vec<CommandDef>,
    /// POSIX-style flags: `--long`, `-s` and shorthand clusters.
    /// When unset, any token starting with `-` is a flag name token.
    pub posix: bool,
    /// Every token is treated as a positional argument.
    pub disable_flag_parsing: bool,
}

impl CommandDef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: vec![name.clone()],
            name,
            aliases: Vec::new(),
            description: String::new(),
            hidden: false,
            flags: Vec::new(),
            exclusive_groups: Vec::new(),
            subcommands: Vec::new(),
            posix: true,
            disable_flag_parsing: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn flag(mut self, flag: FlagDef) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn exclusive<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusive_groups
            .push(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn non_posix(mut self) -> Self {
        self.posix = false;
        self
    }

    pub fn disable_flag_parsing(mut self) -> Self {
        self.disable_flag_parsing = true;
        self
    }

    /// Attach a subcommand, rebasing its path (and its descendants') below this command.
    pub fn subcommand(mut self, mut command: CommandDef) -> Self {
        command.rebase(&self.path);
        self.subcommands.push(command);
        self
    }

    fn rebase(&mut self, parent: &[String]) {
        let mut path = parent.to_vec();
        path.push(self.name.clone());
        self.path = path;
        let own = self.path.clone();
        for sub in &mut self.subcommands {
            sub.rebase(&own);
        }
    }

    /// Stable identity used as registry key (e.g., "demo action").
    pub fn id(&self) -> String {
        self.path.join(" ")
    }

    /// Find a direct subcommand by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<&CommandDef> {
        self.subcommands
            .iter()
            .find(|c| c.name == name || c.aliases.iter().any(|a| a == name))
    }
}

/// Effective flags of a command chain: the last command's own flags plus
/// the persistent flags of its ancestors.
#[derive(Debug, Clone)]
pub struct FlagSet<'a> {
    flags: Vec<&'a FlagDef>,
    groups: Vec<&'a [String]>,
    posix: bool,
}

impl<'a> FlagSet<'a> {
    /// Build the flag set for `chain` (root first).
    pub fn for_chain(chain: &[&'a CommandDef]) -> Self {
        let Some((current, ancestors)) = chain.split_last() else {
            return Self {
                flags: Vec::new(),
                groups: Vec::new(),
                posix: true,
            };
        };

        let mut flags: Vec<&'a FlagDef> = current.flags.iter().collect();
        for ancestor in ancestors.iter().rev() {
            for flag in ancestor.flags.iter().filter(|f| f.persistent) {
                // Local definitions shadow inherited ones.
                if !flags.iter().any(|f| f.long == flag.long) {
                    flags.push(flag);
                }
            }
        }

        Self {
            flags,
            groups: current.exclusive_groups.iter().map(Vec::as_slice).collect(),
            posix: current.posix,
        }
    }

    pub fn is_posix(&self) -> bool {
        self.posix
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a FlagDef> + '_ {
        self.flags.iter().copied()
    }

    pub fn lookup(&self, long: &str) -> Option<&'a FlagDef> {
        self.iter().find(|f| f.long == long)
    }

    pub fn shorthand_lookup(&self, short: char) -> Option<&'a FlagDef> {
        self.iter().find(|f| f.short == Some(short))
    }

    /// Whether another member of one of `flag`'s exclusive groups is already set.
    pub fn is_mutually_exclusive(&self, flag: &FlagDef, changed: &[String]) -> bool {
        self.groups
            .iter()
            .filter(|group| group.iter().any(|name| *name == flag.long))
            .flat_map(|group| group.iter())
            .any(|name| *name != flag.long && changed.iter().any(|c| c == name))
    }
}
