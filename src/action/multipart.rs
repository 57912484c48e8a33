//! Multi-part values: complete `a/b/c` one segment at a time.

use crate::action::value::{InvokedAction, RawValue};

/// Offer the next segment of every value that agrees with the segments
/// already typed in `current`.
///
/// The inserted value keeps the typed prefix, the display shows only the
/// segment. Segments with more to come carry their trailing separator and
/// suppress the trailing space.
pub(crate) fn next_segments(current: &str, separator: char, values: &[String]) -> InvokedAction {
    let (prefix, partial) = match current.rfind(separator) {
        Some(index) => current.split_at(index + separator.len_utf8()),
        None => ("", current),
    };

    let typed: Vec<&str> = match prefix.strip_suffix(separator) {
        Some(joined) => joined.split(separator).collect(),
        None => Vec::new(),
    };

    let mut candidates: Vec<RawValue> = Vec::new();
    for value in values {
        let segments: Vec<&str> = value.split(separator).collect();
        if segments.len() <= typed.len() || segments[..typed.len()] != typed[..] {
            continue;
        }

        let next = segments[typed.len()];
        if !next.starts_with(partial) {
            continue;
        }

        let more = segments.len() > typed.len() + 1;
        let display = if more {
            format!("{}{}", next, separator)
        } else {
            next.to_string()
        };

        if candidates.iter().any(|c| c.display == display) {
            continue;
        }

        candidates.push(
            RawValue::new(format!("{}{}", prefix, display))
                .display(display)
                .no_space(more),
        );
    }

    InvokedAction::from_values(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Vec<String> {
        ["multi/parts", "multi/parts/example", "multi/parts/test", "example/parts"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn displays(invoked: &InvokedAction) -> Vec<&str> {
        invoked.values.iter().map(|v| v.display.as_str()).collect()
    }

    #[test]
    fn first_segment() {
        let invoked = next_segments("", '/', &values());
        assert_eq!(displays(&invoked), vec!["multi/", "example/"]);
        assert!(invoked.values.iter().all(|v| v.no_space));
    }

    #[test]
    fn next_segment_only() {
        let invoked = next_segments("multi/", '/', &values());
        assert_eq!(displays(&invoked), vec!["parts", "parts/"]);
        assert_eq!(invoked.values[0].value, "multi/parts");
        assert!(!invoked.values[0].no_space);
        assert_eq!(invoked.values[1].value, "multi/parts/");
        assert!(invoked.values[1].no_space);
    }

    #[test]
    fn last_segment() {
        let invoked = next_segments("example/", '/', &values());
        assert_eq!(displays(&invoked), vec!["parts"]);
        assert_eq!(invoked.values[0].value, "example/parts");
    }

    #[test]
    fn partial_segment_filters() {
        let invoked = next_segments("multi/parts/t", '/', &values());
        assert_eq!(displays(&invoked), vec!["test"]);
        assert_eq!(invoked.values[0].value, "multi/parts/test");
    }

    #[test]
    fn unmatched_prefix_yields_nothing() {
        let invoked = next_segments("other/", '/', &values());
        assert!(invoked.values.is_empty());
    }
}
