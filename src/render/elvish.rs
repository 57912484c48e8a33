use crate::action::InvokedAction;
use crate::context::Context;
use crate::render::{candidates, Renderer};

/// Characters dropped so candidates survive single-quoting in elvish.
const UNSAFE: &[char] = &[
    '$', '`', '\n', '\\', '"', '\'', '|', '>', '<', '&', '(', ')', ';', '#',
];

/// `edit:complex-candidate` lines for an elvish arg-completer.
#[derive(Debug, Clone)]
pub struct Elvish {
    message_style: String,
}

impl Elvish {
    pub fn new(message_style: impl Into<String>) -> Self {
        Self {
            message_style: message_style.into(),
        }
    }
}

impl Renderer for Elvish {
    fn render(&self, invoked: &InvokedAction, context: &Context) -> String {
        candidates(invoked, context, &self.message_style)
            .iter()
            .map(|raw| {
                let value = sanitize(&raw.value);
                let display = sanitize(&raw.display);
                let description = sanitize(raw.trimmed_description());
                if description.is_empty() {
                    format!("edit:complex-candidate '{}' &display='{}'", value, display)
                } else {
                    format!(
                        "edit:complex-candidate '{}' &display='{} ({})'",
                        value, display, description
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn sanitize(text: &str) -> String {
    text.replace(UNSAFE, "")
}
