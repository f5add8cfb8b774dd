// Golden-master comparison - line splitting and unified diffs

use similar::TextDiff;

/// Label of the reference side in diff headers.
pub const EXPECTED_LABEL: &str = "Expected";

/// Label of the captured side in diff headers.
pub const ACTUAL_LABEL: &str = "Actual";

/// Split text into lines on `\n` or `\r\n`.
///
/// Mirrors a plain regex split: text ending in a terminator yields a final
/// empty line, and a lone trailing `\r` stays part of the last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let terminated = lines.len() - 1;
    for line in &mut lines[..terminated] {
        *line = line.strip_suffix('\r').unwrap_or(line);
    }
    lines
}

/// Unified diff of `expected` against `actual`, or `None` when the lines
/// are identical.
pub fn changes(expected: &str, actual: &str, context_lines: usize) -> Option<String> {
    let expected = split_lines(expected);
    let actual = split_lines(actual);
    if expected == actual {
        return None;
    }
    Some(unified_diff(&expected, &actual, context_lines))
}

/// Render a unified diff between two line sequences.
pub fn unified_diff(expected: &[&str], actual: &[&str], context_lines: usize) -> String {
    let diff = TextDiff::configure().diff_slices(expected, actual);
    diff.unified_diff()
        .context_radius(context_lines)
        .header(EXPECTED_LABEL, ACTUAL_LABEL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_bare_and_crlf_terminators() {
        assert_eq!(split_lines("a\r\nb\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn trailing_terminator_yields_empty_last_line() {
        assert_eq!(split_lines("LOG: goodbye\n"), vec!["LOG: goodbye", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn lone_trailing_carriage_return_is_kept() {
        assert_eq!(split_lines("a\r"), vec!["a\r"]);
    }

    #[test]
    fn identical_text_has_no_changes() {
        assert!(changes("one\ntwo\n", "one\r\ntwo\r\n", 1).is_none());
    }

    #[test]
    fn diff_names_both_sides() {
        let diff = changes("LOG: hello", "LOG: goodbye\n", 1).unwrap();
        assert!(diff.contains("--- Expected"));
        assert!(diff.contains("+++ Actual"));
        assert!(diff.contains("-LOG: hello"));
        assert!(diff.contains("+LOG: goodbye"));
    }

    #[test]
    fn context_is_limited_to_one_line() {
        let expected = "a\nb\nc\nd\ne\nf\ng";
        let actual = "a\nb\nc\nD\ne\nf\ng";
        let diff = changes(expected, actual, 1).unwrap();
        assert!(diff.contains(" c"));
        assert!(diff.contains(" e"));
        assert!(!diff.contains(" b"));
        assert!(!diff.contains(" f"));
    }
}
