// common.rs — misc helpers used across the client
//
// Date formatting, path handling and small string utilities. Nothing in
// here owns state; these are the leaf helpers everything else leans on.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

pub const MAXSTR: usize = 256;

// ============================================================
// Time
// ============================================================

/// Format a UTC timestamp for display in the local timezone.
pub fn date_to_str(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Parse a `YYYY-MM-DDTHH:MM:SS` string as UTC, as stored in replay
/// headers.
pub fn make_time_from_utc(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Render a UTC timestamp in the replay-header form.
pub fn time_to_utc_str(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S").to_string()
}

// ============================================================
// Strings
// ============================================================

/// Truncate a string to `max` characters for display, dropping either the
/// head or the tail and marking the cut with an ellipsis.
pub fn truncate_display(s: &str, max: usize, keep_tail: bool) -> String {
    let len = s.chars().count();
    if len <= max || max == 0 {
        return s.to_string();
    }

    if keep_tail {
        let skip = len - (max - 1);
        let tail: String = s.chars().skip(skip).collect();
        format!("\u{2026}{}", tail)
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{}\u{2026}", head)
    }
}

/// Strip a trailing newline (and CR) in place, returning the slice.
pub fn strip_newline(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

// ============================================================
// Paths
// ============================================================

pub fn path_is_sep(c: char) -> bool {
    c == '/' || c == '\\'
}

pub fn path_join(head: &str, tail: &str) -> String {
    if head.is_empty() {
        return tail.to_string();
    }
    if tail.is_empty() {
        return head.to_string();
    }
    if head.ends_with(path_is_sep) {
        format!("{}{}", head, tail)
    } else {
        format!("{}/{}", head, tail)
    }
}

/// Collapse backslashes and duplicate separators to single forward
/// slashes.
pub fn path_normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_sep = false;

    for c in path.chars() {
        if path_is_sep(c) {
            if !prev_sep {
                out.push('/');
            }
            prev_sep = true;
        } else {
            out.push(c);
            prev_sep = false;
        }
    }

    out
}

pub fn base_name(name: &str) -> &str {
    match name.rfind(path_is_sep) {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

/// Base name with a known suffix removed, e.g. `Replays/foo.nbr` with
/// `.nbr` gives `foo`.
pub fn base_name_sans<'a>(name: &'a str, suffix: &str) -> &'a str {
    let base = base_name(name);
    base.strip_suffix(suffix).unwrap_or(base)
}

pub fn dir_name(name: &str) -> &str {
    match name.rfind(path_is_sep) {
        Some(0) => "/",
        Some(i) => &name[..i],
        None => ".",
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_header_date_roundtrip() {
        let t = make_time_from_utc("2024-03-09T18:30:05").unwrap();
        assert_eq!(time_to_utc_str(t), "2024-03-09T18:30:05");
    }

    #[test]
    fn bad_date_is_none() {
        assert!(make_time_from_utc("not a date").is_none());
    }

    #[test]
    fn truncation_marks_the_cut() {
        assert_eq!(truncate_display("abcdef", 4, false), "abc\u{2026}");
        assert_eq!(truncate_display("abcdef", 4, true), "\u{2026}def");
        assert_eq!(truncate_display("abc", 8, false), "abc");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        assert_eq!(truncate_display("\u{00e9}\u{00e9}\u{00e9}", 8, false), "\u{00e9}\u{00e9}\u{00e9}");
    }

    #[test]
    fn join_and_normalize() {
        assert_eq!(path_join("Replays", "foo.nbr"), "Replays/foo.nbr");
        assert_eq!(path_join("Replays/", "foo.nbr"), "Replays/foo.nbr");
        assert_eq!(path_normalize("a\\\\b//c"), "a/b/c");
    }

    #[test]
    fn base_and_dir_names() {
        assert_eq!(base_name("Replays/foo.nbr"), "foo.nbr");
        assert_eq!(base_name_sans("Replays/foo.nbr", ".nbr"), "foo");
        assert_eq!(base_name_sans("foo", ".nbr"), "foo");
        assert_eq!(dir_name("Replays/foo.nbr"), "Replays");
        assert_eq!(dir_name("foo.nbr"), ".");
    }
}
