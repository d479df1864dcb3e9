use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::calendar::{CalendarLayout, DayCell, DayStatus, MonthGrid};
use crate::config::Config;
use crate::messages::{Catalog, Messages};
use crate::plan::{AvailabilityPlan, weekday_key};

const PIXELS_PER_COLUMN: u32 = 12;
const MIN_CELL_COLUMNS: usize = 3;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    messages: Catalog,
}

impl Renderer {
    pub fn new(cfg: &Config, messages: Catalog) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color, messages })
    }

    pub fn messages(&self) -> &Catalog {
        &self.messages
    }

    #[tracing::instrument(skip(self, grid, layout), fields(month = %grid.month))]
    pub fn print_month(&mut self, grid: &MonthGrid, layout: &CalendarLayout) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        let paint = self.color && io::stdout().is_terminal();
        write_month(&mut out, grid, layout, paint)?;
        writeln!(out)?;
        self.write_legend(&mut out, paint)?;
        Ok(())
    }

    #[tracing::instrument(skip(self, plan))]
    pub fn print_plan(&mut self, plan: &AvailabilityPlan) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "type  {}", plan.plan_type())?;

        let rows = plan
            .entries()
            .iter()
            .map(|entry| vec![weekday_key(entry.day_of_week).to_string(), entry.seats.to_string()])
            .collect();
        write_table(&mut out, vec!["Day".to_string(), "Seats".to_string()], rows)?;
        Ok(())
    }

    pub fn print_line(&mut self, text: &str) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{text}")?;
        Ok(())
    }

    fn write_legend<W: Write>(&self, mut writer: W, paint: bool) -> anyhow::Result<()> {
        let entries = [
            (DayStatus::Today, "EditListingAvailabilityForm.legendToday"),
            (DayStatus::Blocked, "EditListingAvailabilityForm.legendBlocked"),
            (DayStatus::Reserved, "EditListingAvailabilityForm.legendReserved"),
            (DayStatus::Past, "EditListingAvailabilityForm.legendPast"),
        ];

        let items = entries
            .iter()
            .map(|(status, id)| {
                let marker = status_marker(*status);
                let swatch = if paint {
                    format!("\x1b[{}m{marker}\x1b[0m", status_color(*status))
                } else {
                    marker.to_string()
                };
                format!("{swatch} {}", self.messages.text(id))
            })
            .collect::<Vec<_>>();
        writeln!(writer, "{}", items.join("   "))?;
        Ok(())
    }
}

fn cell_columns(layout: &CalendarLayout) -> usize {
    ((layout.day_size / PIXELS_PER_COLUMN) as usize).max(MIN_CELL_COLUMNS)
}

fn status_color(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Past => "90",
        DayStatus::Today => "1;4",
        DayStatus::Reserved => "35",
        DayStatus::Blocked => "31",
        DayStatus::Open => "32",
    }
}

fn status_marker(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Past => ".",
        DayStatus::Today => "*",
        DayStatus::Reserved => "r",
        DayStatus::Blocked => "x",
        DayStatus::Open => " ",
    }
}

fn format_cell(cell: &DayCell, paint: bool) -> String {
    let text = format!("{}{}", cell.label(), status_marker(cell.status));
    if !paint {
        return text;
    }
    let code = if cell.outside_month { "2" } else { status_color(cell.status) };
    format!("\x1b[{code}m{text}\x1b[0m")
}

fn write_month<W: Write>(
    mut writer: W,
    grid: &MonthGrid,
    layout: &CalendarLayout,
    paint: bool,
) -> anyhow::Result<()> {
    let columns = cell_columns(layout);
    let title = grid.month.title();
    let total = columns * 7;
    writeln!(writer, "{title:^total$}")?;

    for label in grid.weekday_labels() {
        write!(writer, "{label:<columns$}")?;
    }
    writeln!(writer)?;

    for week in &grid.weeks {
        for cell in week {
            let text = format_cell(cell, paint);
            let visible_width = UnicodeWidthStr::width(strip_ansi(&text).as_str());
            let padding = columns.saturating_sub(visible_width);
            write!(writer, "{}{}", text, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
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
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
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

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Weekday};

    use super::*;
    use crate::changes::MonthChangeSet;

    fn june_grid() -> MonthGrid {
        MonthGrid::build(
            "2024-06".parse().expect("valid month"),
            Weekday::Sun,
            NaiveDate::from_ymd_opt(2024, 6, 15).expect("valid date"),
            &MonthChangeSet::empty(),
        )
    }

    #[test]
    fn plain_month_has_title_labels_and_markers() {
        let layout = CalendarLayout::for_width(800).expect("measured");
        let mut buf = Vec::new();
        write_month(&mut buf, &june_grid(), &layout, false).expect("render");
        let text = String::from_utf8(buf).expect("utf8");

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].trim(), "June 2024");
        assert!(lines[1].starts_with("Su"));
        assert!(text.contains("15*"));
        assert!(text.contains("14."));
        assert_eq!(lines.len(), 2 + 6);
    }

    #[test]
    fn narrow_layout_keeps_minimum_cell_width() {
        let layout = CalendarLayout::for_width(200).expect("measured");
        assert_eq!(cell_columns(&layout), MIN_CELL_COLUMNS);
    }

    #[test]
    fn strip_ansi_removes_escapes() {
        assert_eq!(strip_ansi("\x1b[31m12x\x1b[0m"), "12x");
    }

    #[test]
    fn table_pads_columns() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            vec!["Day".to_string(), "Seats".to_string()],
            vec![vec!["mon".to_string(), "1".to_string()]],
        )
        .expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("Day Seats"));
        assert!(text.contains("mon 1"));
    }
}
