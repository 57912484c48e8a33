//! Renderers: turn resolved candidates into what a shell consumes.
//!
//! ```text
//! InvokedAction → filter by current word → sort by display → shell format
//! ```

mod elvish;
mod export;
mod nushell;

pub use elvish::Elvish;
pub use export::ExportRenderer;
pub use nushell::Nushell;

use crate::action::{InvokedAction, RawValue};
use crate::config::Styles;
use crate::context::Context;

/// Formats resolved candidates for one shell.
pub trait Renderer {
    fn render(&self, invoked: &InvokedAction, context: &Context) -> String;
}

/// Names accepted by [`for_shell`].
pub const SHELLS: [&str; 3] = ["elvish", "export", "nushell"];

/// Renderer for `shell`, if supported.
pub fn for_shell(shell: &str, styles: &Styles) -> Option<Box<dyn Renderer>> {
    match shell {
        "export" => Some(Box::new(ExportRenderer)),
        "nushell" => Some(Box::new(Nushell::new(styles.message.clone()))),
        "elvish" => Some(Box::new(Elvish::new(styles.message.clone()))),
        _ => None,
    }
}

/// Filtered, display-sorted candidates with messages appended as entries
/// that leave the current word unchanged.
///
/// A lone candidate would be inserted right away, so a second placeholder
/// is added whenever messages are shown.
fn candidates(invoked: &InvokedAction, context: &Context, message_style: &str) -> Vec<RawValue> {
    let mut values = invoked
        .clone()
        .filter_prefix(&context.value)
        .sort_by_display()
        .values;

    if !invoked.meta.messages.is_empty() {
        for message in &invoked.meta.messages {
            values.push(
                RawValue::new(context.value.clone())
                    .display("ERR")
                    .description(message.clone())
                    .style(message_style),
            );
        }
        if values.len() == 1 {
            values.push(RawValue::new(context.value.clone()).display("_"));
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_shell_knows_every_listed_shell() {
        let styles = Styles::default();
        for shell in SHELLS {
            assert!(for_shell(shell, &styles).is_some(), "{shell}");
        }
        assert!(for_shell("tcsh", &styles).is_none());
    }

    #[test]
    fn candidates_filter_and_sort() {
        let invoked = InvokedAction::from_values(vec![
            RawValue::new("values"),
            RawValue::new("example").display("b-example"),
            RawValue::new("extra").display("a-extra"),
        ]);
        let context = Context::new(["ex"]);
        let values = candidates(&invoked, &context, "");
        let displays: Vec<_> = values.iter().map(|v| v.display.as_str()).collect();
        assert_eq!(displays, vec!["a-extra", "b-example"]);
    }

    #[test]
    fn lone_message_gets_a_placeholder() {
        let invoked = InvokedAction::message("no candidates");
        let context = Context::new(["cur"]);
        let values = candidates(&invoked, &context, "yellow");
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value, "cur");
        assert_eq!(values[0].description, "no candidates");
        assert_eq!(values[0].style, "yellow");
        assert_eq!(values[1].display, "_");
    }
}
