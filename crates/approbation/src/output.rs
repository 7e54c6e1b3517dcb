//! Output formatting: console tables, coloured percentages and CSV

use approbation_core::Percent;
use owo_colors::OwoColorize;

/// Output format for check-references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// A plain-text table with a bold header row and a separator line.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// A row of `---` in every column
    pub fn add_separator(&mut self) {
        self.rows.push(vec!["---".to_string(); self.headers.len()]);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut output = String::new();
        output.push_str(&line(&self.headers).bold().to_string());
        output.push('\n');
        output.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        output.push('\n');
        for row in &self.rows {
            output.push_str(&line(row));
            output.push('\n');
        }
        output
    }

    /// CSV with CRLF line endings. Cells never contain commas here, since
    /// category and file names are joined with spaces.
    pub fn to_csv(&self) -> String {
        let mut csv = self.headers.join(",");
        for row in &self.rows {
            csv.push_str("\r\n");
            csv.push_str(&row.join(","));
        }
        csv
    }
}

/// `12.5%`, or `n/a`
pub fn percent_cell(percent: Percent) -> String {
    match percent.value() {
        Some(_) => format!("{}%", percent),
        None => percent.to_string(),
    }
}

/// A percentage coloured green (>= 80), yellow (>= 50) or red.
pub fn colored_percent(percent: Percent) -> String {
    let text = percent_cell(percent);
    match percent.value() {
        Some(value) if value >= 80.0 => text.green().to_string(),
        Some(value) if value >= 50.0 => text.yellow().to_string(),
        Some(_) => text.red().to_string(),
        None => text.dimmed().to_string(),
    }
}

/// A count, or `-` when zero
pub fn count_or_dash(count: usize) -> String {
    if count == 0 {
        "-".to_string()
    } else {
        count.to_string()
    }
}
