use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub styles: Styles,
}

/// Completion behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Offer hidden flags and subcommands as candidates.
    #[serde(default)]
    pub show_hidden: bool,
}

/// Styles for candidates the engine generates itself.
///
/// Each entry is a space-separated list of style words (e.g., "bold blue").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Styles {
    /// Flag names (default: "blue").
    #[serde(default = "default_flag_style")]
    pub flag: String,
    /// Flag values without a style of their own (default: none).
    #[serde(default)]
    pub flag_value: String,
    /// Subcommand names (default: "bold").
    #[serde(default = "default_subcommand_style")]
    pub subcommand: String,
    /// Messages shown as candidates (default: "yellow").
    #[serde(default = "default_message_style")]
    pub message: String,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            flag: default_flag_style(),
            flag_value: String::new(),
            subcommand: default_subcommand_style(),
            message: default_message_style(),
        }
    }
}

fn default_flag_style() -> String {
    "blue".to_string()
}

fn default_subcommand_style() -> String {
    "bold".to_string()
}

fn default_message_style() -> String {
    "yellow".to_string()
}
