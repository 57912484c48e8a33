//! Resolved candidates: what every action eventually flattens into.

use serde::{Deserialize, Serialize};

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawValue {
    /// Text inserted into the command line.
    pub value: String,
    /// Text shown in the candidate list.
    pub display: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub style: String,
    /// No trailing space after insertion (e.g., partial paths).
    #[serde(default)]
    pub no_space: bool,
}

impl RawValue {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            display: value.clone(),
            value,
            description: String::new(),
            style: String::new(),
            no_space: false,
        }
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn no_space(mut self, no_space: bool) -> Self {
        self.no_space = no_space;
        self
    }

    /// Description cut to its first line.
    pub fn trimmed_description(&self) -> &str {
        self.description.lines().next().unwrap_or_default().trim()
    }
}

/// Metadata travelling with resolved candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Help messages shown where no real candidates exist.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
    /// Usage hint for the slot being completed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub usage: String,
}

/// A fully resolved action: concrete candidates and messages, nothing left to call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokedAction {
    pub meta: Meta,
    pub values: Vec<RawValue>,
}

impl InvokedAction {
    pub fn from_values(values: Vec<RawValue>) -> Self {
        Self {
            meta: Meta::default(),
            values,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            meta: Meta {
                messages: vec![message.into()],
                usage: String::new(),
            },
            values: Vec::new(),
        }
    }

    /// Append another resolved action: values and messages in order, the
    /// first non-empty usage wins.
    pub fn merge(&mut self, other: InvokedAction) {
        self.values.extend(other.values);
        self.meta.messages.extend(other.meta.messages);
        if self.meta.usage.is_empty() {
            self.meta.usage = other.meta.usage;
        }
    }

    /// Keep only candidates whose value starts with `prefix`.
    pub fn filter_prefix(mut self, prefix: &str) -> Self {
        self.values.retain(|v| v.value.starts_with(prefix));
        self
    }

    /// Stable sort by display text (normal completion output).
    pub fn sort_by_display(mut self) -> Self {
        self.values.sort_by(|a, b| a.display.cmp(&b.display));
        self
    }

    /// Stable sort by value (sandbox comparisons).
    pub fn sort_by_value(mut self) -> Self {
        self.values.sort_by(|a, b| a.value.cmp(&b.value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.meta.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_displays_value() {
        let value = RawValue::new("example");
        assert_eq!(value.display, "example");
        assert!(!value.no_space);
    }

    #[test]
    fn trimmed_description_keeps_first_line() {
        let value = RawValue::new("x").description("  first\nsecond");
        assert_eq!(value.trimmed_description(), "first");
    }

    #[test]
    fn filter_then_sort_by_display() {
        let invoked = InvokedAction::from_values(vec![
            RawValue::new("b-value").display("a"),
            RawValue::new("a-value").display("b"),
            RawValue::new("other"),
        ]);

        let filtered = invoked.clone().filter_prefix("").sort_by_display();
        let displays: Vec<_> = filtered.values.iter().map(|v| v.display.as_str()).collect();
        assert_eq!(displays, vec!["a", "b", "other"]);

        let filtered = invoked.filter_prefix("b").sort_by_value();
        assert_eq!(filtered.values.len(), 1);
        assert_eq!(filtered.values[0].value, "b-value");
    }

    #[test]
    fn merge_keeps_order_and_first_usage() {
        let mut first = InvokedAction::from_values(vec![RawValue::new("a")]);
        first.meta.usage = "first".to_string();
        let mut second = InvokedAction::message("msg");
        second.values.push(RawValue::new("b"));
        second.meta.usage = "second".to_string();

        first.merge(second);
        assert_eq!(first.values.len(), 2);
        assert_eq!(first.meta.messages, vec!["msg"]);
        assert_eq!(first.meta.usage, "first");
    }

    #[test]
    fn messages_survive_filtering() {
        let invoked = InvokedAction::message("nothing to complete").filter_prefix("x");
        assert!(!invoked.is_empty());
    }
}
