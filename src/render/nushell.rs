use serde::Serialize;

use crate::action::InvokedAction;
use crate::context::Context;
use crate::render::{candidates, Renderer};
use crate::style::{self, Shade};

/// Characters that make nushell treat a value as more than one word.
const SPECIAL: &[char] = &[
    ' ', '{', '}', '(', ')', '[', ']', '<', '>', '$', '&', '"', '|', ';', '#', '\\', '`',
];

/// Records for a nushell external completer.
#[derive(Debug, Clone)]
pub struct Nushell {
    message_style: String,
}

impl Nushell {
    pub fn new(message_style: impl Into<String>) -> Self {
        Self {
            message_style: message_style.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Record {
    value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<NuStyle>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct NuStyle {
    #[serde(skip_serializing_if = "String::is_empty")]
    fg: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    bg: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    attr: String,
}

impl Renderer for Nushell {
    fn render(&self, invoked: &InvokedAction, context: &Context) -> String {
        let records: Vec<Record> = candidates(invoked, context, &self.message_style)
            .into_iter()
            .map(|raw| {
                let mut value = sanitize(&raw.value);
                if value.contains(SPECIAL) {
                    value = format!("'{}'", value);
                }
                if !raw.no_space {
                    value.push(' ');
                }
                Record {
                    value,
                    description: sanitize(raw.trimmed_description()),
                    style: nu_style(&raw.style),
                }
            })
            .collect();

        serde_json::to_string(&records).unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to encode nushell records");
            "[]".to_string()
        })
    }
}

fn sanitize(text: &str) -> String {
    text.replace(['\n', '\r'], "")
}

fn nu_style(raw: &str) -> Option<NuStyle> {
    let parsed = style::parse_lenient(raw);
    if parsed.is_plain() {
        return None;
    }

    let mut attr = String::new();
    for (set, code) in [
        (parsed.bold, 'b'),
        (parsed.dim, 'd'),
        (parsed.italic, 'i'),
        (parsed.underlined, 'u'),
        (parsed.blink, 'l'),
        (parsed.inverse, 'r'),
    ] {
        if set {
            attr.push(code);
        }
    }

    Some(NuStyle {
        fg: parsed.foreground.map(color_name).unwrap_or_default(),
        bg: parsed.background.map(color_name).unwrap_or_default(),
        attr,
    })
}

fn color_name(shade: Shade) -> String {
    if shade.bright {
        format!("light_{}", shade.color.name())
    } else {
        shade.color.name().to_string()
    }
}
