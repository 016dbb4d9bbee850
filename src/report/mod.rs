pub mod render;
pub mod style;

use chrono::Duration;

use style::{Palette, Role};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Format a duration as its two most significant units, e.g. `1h5m` or `2d3h`.
/// Days are only used past 24 hours. Zero and negative spans render as `-`.
pub fn format_duration(duration: Duration) -> String {
    let mut seconds = duration.num_seconds().max(0);
    let mut parts = Vec::new();

    if seconds / HOUR > 24 {
        parts.push(format!("{}d", seconds / DAY));
        seconds %= DAY;
    }
    for (unit, suffix) in [(HOUR, "h"), (MINUTE, "m"), (1, "s")] {
        let count = seconds / unit;
        if count > 0 {
            parts.push(format!("{}{}", count, suffix));
            seconds %= unit;
        }
    }

    if parts.is_empty() {
        return "-".to_string();
    }
    parts.truncate(2);
    parts.concat()
}

/// A table cell made of spans, each optionally styled
#[derive(Debug, Clone)]
pub struct Cell {
    spans: Vec<(String, Option<Role>)>,
}

impl Cell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            spans: vec![(text.into(), None)],
        }
    }

    pub fn styled(text: impl Into<String>, role: Role) -> Self {
        Self {
            spans: vec![(text.into(), Some(role))],
        }
    }

    /// Append a plain span
    pub fn then(mut self, text: impl Into<String>) -> Self {
        self.spans.push((text.into(), None));
        self
    }

    /// Append a styled span
    pub fn then_styled(mut self, text: impl Into<String>, role: Role) -> Self {
        self.spans.push((text.into(), Some(role)));
        self
    }

    fn width(&self) -> usize {
        self.spans.iter().map(|(text, _)| text.chars().count()).sum()
    }

    fn paint(&self, palette: &Palette) -> String {
        self.spans
            .iter()
            .map(|(text, role)| match role {
                Some(role) => palette.paint(*role, text),
                None => text.clone(),
            })
            .collect()
    }
}

/// Borderless, left-aligned table with two spaces between columns
#[derive(Debug, Default)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn render(&self, palette: &Palette) -> String {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    line.push_str("  ");
                }
                line.push_str(&cell.paint(palette));
                if i + 1 < row.len() {
                    let pad = widths[i] - cell.width();
                    line.push_str(&" ".repeat(pad));
                }
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}
