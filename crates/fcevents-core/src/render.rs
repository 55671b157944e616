use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::catalog::Catalog;
use crate::dimension::Dimension;
use crate::program::{Program, ProgramEntry};
use crate::sync::Frame;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    /// `setting` is `on`/`off` (and the usual boolean spellings). Colour is
    /// only emitted when stdout is a terminal.
    pub fn new(setting: &str) -> anyhow::Result<Self> {
        let color = match setting.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    #[tracing::instrument(skip_all)]
    pub fn write_frame<W: Write>(
        &self,
        mut out: W,
        frame: &Frame,
        entries: &[ProgramEntry],
        catalog: &Catalog,
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&frame.header, &header_code(frame, catalog)))?;
        writeln!(out, "filters   {}", frame.summary)?;

        if !frame.tags.is_empty() {
            let tags = frame
                .tags
                .iter()
                .map(|tag| self.paint(&tag.label, "33"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(out, "tags      {tags}")?;
        }
        writeln!(out)?;

        if frame.show_empty {
            writeln!(out, "{}", self.paint(&frame.empty_message, "31"))?;
            return Ok(());
        }

        let headers = vec![
            "Title".to_string(),
            "Groups".to_string(),
            "Audiences".to_string(),
            "Days".to_string(),
        ];

        let rows = frame
            .visible_indices()
            .into_iter()
            .filter_map(|idx| entries.get(idx))
            .filter_map(|entry| {
                entry
                    .program
                    .as_ref()
                    .map(|program| program_row(&entry.title, program, catalog))
            })
            .collect::<Vec<_>>();

        write_table(&mut out, headers, rows)?;
        writeln!(out)?;
        writeln!(out, "{} of {} programs shown", frame.visible_count, entries.len())?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

/// Bold, in the active category's colour when the catalog gives it one.
fn header_code(frame: &Frame, catalog: &Catalog) -> String {
    frame
        .controls
        .iter()
        .find(|control| control.dimension == Dimension::Category && control.active)
        .and_then(|control| catalog.option(Dimension::Category, &control.value))
        .and_then(|option| option.rgb())
        .map(|(r, g, b)| format!("1;38;2;{r};{g};{b}"))
        .unwrap_or_else(|| "1".to_string())
}

fn program_row(title: &str, program: &Program, catalog: &Catalog) -> Vec<String> {
    let labels = |dim: Dimension| {
        let mut values = program
            .values(dim)
            .iter()
            .map(|id| (catalog.position(dim, id).unwrap_or(usize::MAX), id))
            .collect::<Vec<_>>();
        values.sort();
        values
            .into_iter()
            .map(|(_, id)| catalog.label(dim, id).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    vec![
        title.to_string(),
        labels(Dimension::Category),
        labels(Dimension::Audience),
        labels(Dimension::Day),
    ]
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
