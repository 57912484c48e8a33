//! Shell completion engine.
//!
//! ```text
//! CommandDef tree ─┐
//!                  ├─► Completer::complete(Context) ─► InvokedAction ─► Renderer ─► shell
//! Registry ────────┘
//! ```
//!
//! A host program declares its commands ([`command`]), binds [`action::Action`]s
//! to flags and positional slots ([`registry`]) and answers requests sent to
//! its hidden `_compline` subcommand ([`completer::Completer::serve`]).

pub mod action;
pub mod command;
pub mod completer;
pub mod config;
pub mod context;
pub mod export;
pub mod logging;
pub mod registry;
pub mod render;
pub mod sandbox;
pub mod style;

pub use action::{Action, ActionMap, InvokedAction, RawValue};
pub use command::{CommandDef, FlagDef};
pub use completer::Completer;
pub use context::Context;
pub use registry::Registry;
