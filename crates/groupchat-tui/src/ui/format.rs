use chrono::{DateTime, TimeZone};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Truncate string to a max length, adding an ellipsis when truncated.
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return ".".repeat(max_len);
    }
    let mut truncated: String = s.chars().take(max_len - 3).collect();
    truncated.push_str("...");
    truncated
}

/// `01 Mar 2025, 10:15 AM`
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.format("%d %b %Y, %I:%M %p").to_string()
}

/// Hard-wrap styled spans to `width` columns. Embedded newlines start a new
/// line, including a trailing one. Always returns at least one line.
pub fn wrap_spans(spans: Vec<Span<'static>>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0usize;
    let mut after_newline = false;

    for span in spans {
        let style = span.style;
        let mut chunk = String::new();
        for c in span.content.chars() {
            if c == '\n' {
                if !chunk.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut chunk), style));
                }
                lines.push(Line::from(std::mem::take(&mut current)));
                used = 0;
                after_newline = true;
                continue;
            }
            let w = c.width().unwrap_or(0);
            if used + w > width && used > 0 {
                if !chunk.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut chunk), style));
                }
                lines.push(Line::from(std::mem::take(&mut current)));
                used = 0;
            }
            chunk.push(c);
            used += w;
            after_newline = false;
        }
        if !chunk.is_empty() {
            current.push(Span::styled(chunk, style));
        }
    }
    if !current.is_empty() || lines.is_empty() || after_newline {
        lines.push(Line::from(current));
    }
    lines
}

/// Display width of `text`, for cursor placement.
pub fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Drop leading characters worth at least `cols` columns. Returns the rest
/// and the width dropped, which overshoots `cols` when a wide character
/// straddles the cut.
pub fn skip_columns(text: &str, cols: usize) -> (&str, usize) {
    let mut skipped = 0;
    for (i, c) in text.char_indices() {
        if skipped >= cols {
            return (&text[i..], skipped);
        }
        skipped += c.width().unwrap_or(0);
    }
    ("", skipped)
}
