//! Utility functions for formatting and text handling.
//!
//! General-purpose helpers shared by the core library and the CLI: duration
//! and byte formatting, stderr tail extraction and escape handling for notes
//! typed on a single line.

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Returns the last `count` non-blank lines of `text`, oldest first.
#[must_use]
pub fn tail_lines(text: &str, count: usize) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].iter().map(|line| (*line).to_string()).collect()
}

/// Expands `\n` to a newline and `\\` to a backslash. Other escapes are kept as typed.
#[must_use]
pub fn unescape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3725.0), "01:02:05");
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MiB");
    }

    #[test]
    fn tail_keeps_last_non_blank_lines() {
        let stderr = "line 1\nline 2\n\nline 3\n   \nline 4\n";
        assert_eq!(tail_lines(stderr, 2), vec!["line 3", "line 4"]);
        assert_eq!(tail_lines(stderr, 10).len(), 4);
        assert!(tail_lines("", 3).is_empty());
    }

    #[test]
    fn unescape_handles_newlines_and_backslashes() {
        assert_eq!(unescape_text(r"first\nsecond"), "first\nsecond");
        assert_eq!(unescape_text(r"a\\nb"), r"a\nb");
        assert_eq!(unescape_text(r"tab\t"), r"tab\t");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }
}
