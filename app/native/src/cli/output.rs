//! CLI output formatting utilities.
//!
//! Colored JSON and small helpers shared by the table views.

use std::fmt::Write as _;

use colored::Colorize;
use serde_json::Value;

const INDENT: &str = "  ";

/// Prints JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
pub fn print_highlighted_json(value: &Value) { println!("{}", highlight_json(value)); }

/// Renders `value` as indented, colored JSON.
#[must_use]
pub fn highlight_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str(&"null".magenta().to_string()),
        Value::Bool(b) => out.push_str(&b.to_string().magenta().to_string()),
        Value::Number(n) => out.push_str(&n.to_string().yellow().to_string()),
        Value::String(s) => out.push_str(&quote(s).green().to_string()),
        Value::Array(items) if items.is_empty() => out.push_str(&"[]".white().bold().to_string()),
        Value::Object(map) if map.is_empty() => out.push_str(&"{}".white().bold().to_string()),
        Value::Array(items) => {
            out.push_str(&"[".white().bold().to_string());
            for (i, item) in items.iter().enumerate() {
                open_entry(out, i, depth + 1);
                write_value(out, item, depth + 1);
            }
            close_container(out, "]", depth);
        }
        Value::Object(map) => {
            out.push_str(&"{".white().bold().to_string());
            for (i, (key, item)) in map.iter().enumerate() {
                open_entry(out, i, depth + 1);
                let _ = write!(out, "{}{} ", quote(key).cyan(), ":".white());
                write_value(out, item, depth + 1);
            }
            close_container(out, "}", depth);
        }
    }
}

fn open_entry(out: &mut String, index: usize, depth: usize) {
    if index > 0 {
        out.push_str(&",".white().to_string());
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
}

fn close_container(out: &mut String, bracket: &str, depth: usize) {
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
    out.push_str(&bracket.white().bold().to_string());
}

fn quote(s: &str) -> String { Value::String(s.to_string()).to_string() }

/// Truncates a string to a maximum number of characters, adding ellipsis if needed.
///
/// Counts characters, not bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Formats a boolean as a colored check or cross.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(value: &Value) -> String {
        colored::control::set_override(false);
        highlight_json(value)
    }

    #[test]
    fn test_highlight_matches_pretty_layout() {
        let value = serde_json::json!({
            "zone": "hidden",
            "drags": [1, 2],
            "pins": [],
            "ok": true,
            "note": null,
        });
        assert_eq!(plain(&value), serde_json::to_string_pretty(&value).unwrap());
    }

    #[test]
    fn test_highlight_escapes_strings() {
        let value = serde_json::json!({ "pin": "a\"b" });
        assert!(plain(&value).contains(r#""a\"b""#));
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello w…");
        assert_eq!(truncate("hello", 1), "…");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("com.example.🌍.app", 14), "com.example.🌍…");
    }

    #[test]
    fn test_format_bool() {
        assert!(format_bool(true).contains('✓'));
        assert!(format_bool(false).contains('✗'));
    }
}
