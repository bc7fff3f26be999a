//! Terminal output utilities: notes on stderr and simple tables.
//!
//! Stdout is reserved for recognized text and machine-readable output, so
//! every note goes to stderr.

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

fn note(symbol: &str, color: &str, plain: &str, msg: &str) {
    if supports_color() {
        eprintln!("{color}{BOLD}{symbol}{RESET} {msg}");
    } else {
        eprintln!("{plain}: {msg}");
    }
}

pub fn note_info(msg: &str) {
    note("ℹ", CYAN, "INFO", msg);
}

pub fn note_warn(msg: &str) {
    note("⚠", YELLOW, "WARN", msg);
}

pub fn note_error(msg: &str) {
    note("✗", RED, "ERROR", msg);
}

pub fn note_success(msg: &str) {
    note("✓", GREEN, "OK", msg);
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

pub struct Column {
    pub header: String,
}

impl Column {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

/// Render left-aligned columns.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let num_cols = columns.len();
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|c| strip_ansi(&c.header).chars().count())
        .collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            widths[i] = widths[i].max(strip_ansi(cell).chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i]))
        .collect();
    out.push_str(&format!("  {}\n", header.join("  ").trim_end()));

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}\n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| pad_cell(row.get(i).map(String::as_str).unwrap_or(""), widths[i]))
            .collect();
        out.push_str(&format!("  {}\n", cells.join("  ").trim_end()));
    }
    out
}

fn pad_cell(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(strip_ansi(s).chars().count());
    format!("{s}{}", " ".repeat(pad))
}
