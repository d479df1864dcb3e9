use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::calendar::{CalendarLayout, MonthGrid, classify};
use crate::changes::AvailabilityCalendarChanges;
use crate::cli::Invocation;
use crate::config::Config;
use crate::datastore::DataStore;
use crate::date_range_filter::{BookingDateRangeFilter, FilterConfig};
use crate::datetime::{format_day, parse_day_expr, project_today};
use crate::editor::{AvailabilityEditor, DayToggle};
use crate::messages::Messages;
use crate::month::MonthKey;
use crate::panel::AvailabilityPanel;
use crate::render::Renderer;

pub fn known_command_names() -> Vec<&'static str> {
    vec![
        "show",
        "month",
        "toggle",
        "status",
        "submit",
        "plan",
        "filter",
        "title",
        "_commands",
        "help",
        "version",
    ]
}

pub fn expand_command_abbrev<'a>(token: &'a str, known: &[&'a str]) -> Option<&'a str> {
    if known.contains(&token) {
        return Some(token);
    }

    let mut matches = known.iter().copied().filter(|name| name.starts_with(token));
    let first = matches.next()?;
    if matches.next().is_some() {
        None
    } else {
        Some(first)
    }
}

/// Panel and editor rebuilt from the data directory for one invocation.
struct Session {
    panel: AvailabilityPanel,
    editor: AvailabilityEditor,
    today: NaiveDate,
}

impl Session {
    #[instrument(skip(store))]
    fn open(store: &DataStore, today: NaiveDate) -> anyhow::Result<Self> {
        let listing = store.load_listing()?;
        let panel = AvailabilityPanel::new(listing).context("listing.json has an invalid plan")?;

        let snapshot = store.load_calendar()?;
        let changes = AvailabilityCalendarChanges::from_snapshot(&snapshot)
            .context("calendar.json is not a valid availability snapshot")?;

        let current_month = match store.get_current_month()? {
            Some(month) => month,
            None => MonthKey::from_day(&today)?,
        };
        debug!(%current_month, months = snapshot.len(), "opened editing session");

        let editor = panel.editor(current_month, changes);
        Ok(Self {
            panel,
            editor,
            today,
        })
    }
}

#[instrument(skip(store, cfg, renderer, inv))]
pub fn dispatch(
    store: &mut DataStore,
    cfg: &Config,
    renderer: &mut Renderer,
    inv: Invocation,
) -> anyhow::Result<()> {
    let today = project_today();
    let command = inv.command.as_str();

    debug!(command, args = ?inv.command_args, %today, "dispatching command");

    match command {
        "show" => cmd_show(store, cfg, renderer, &inv.command_args, today),
        "month" => cmd_month(store, &inv.command_args, today),
        "toggle" => cmd_toggle(store, &inv.command_args, today),
        "status" => cmd_status(store, &inv.command_args, today),
        "submit" => cmd_submit(store, today),
        "plan" => cmd_plan(store, renderer, today),
        "filter" => cmd_filter(renderer, &inv.command_args, today),
        "title" => cmd_title(store, renderer, today),
        "_commands" => cmd_commands(),
        "help" => cmd_help(),
        "version" => {
            println!("vacancy {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => Err(anyhow!("command not implemented: {other}")),
    }
}

#[instrument(skip(store, cfg, renderer, args))]
fn cmd_show(
    store: &DataStore,
    cfg: &Config,
    renderer: &mut Renderer,
    args: &[String],
    today: NaiveDate,
) -> anyhow::Result<()> {
    let session = Session::open(store, today)?;
    let month = match args.first() {
        Some(raw) => raw
            .parse::<MonthKey>()
            .with_context(|| format!("invalid month: {raw}"))?,
        None => session.editor.current_month(),
    };

    let width = cfg.calendar_width()?;
    let Some(layout) = CalendarLayout::for_width(width) else {
        debug!("calendar width is zero; nothing to render");
        return Ok(());
    };

    let grid = MonthGrid::build(
        month,
        cfg.week_start(),
        session.today,
        session.editor.changes().month(month),
    );
    renderer.print_month(&grid, &layout)
}

#[instrument(skip(store, args))]
fn cmd_month(store: &DataStore, args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    let mut session = Session::open(store, today)?;
    let editor = &mut session.editor;

    let month = match args.first().map(|s| s.to_ascii_lowercase()) {
        None => editor.current_month(),
        Some(token) => match token.as_str() {
            "next" => editor.show_next_month()?,
            "prev" | "previous" => editor.show_previous_month()?,
            "today" => editor.set_current_month(MonthKey::from_day(&today)?),
            raw => {
                let month = raw
                    .parse::<MonthKey>()
                    .with_context(|| format!("invalid month: {raw}"))?;
                editor.set_current_month(month)
            }
        },
    };

    store.set_current_month(month)?;
    println!("{month}");
    Ok(())
}

#[instrument(skip(store, args))]
fn cmd_toggle(store: &DataStore, args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    if args.is_empty() {
        return Err(anyhow!("toggle requires at least one day"));
    }

    let mut session = Session::open(store, today)?;
    let editor = &mut session.editor;
    let opened_month = editor.current_month();

    // Resolve every day before touching the data directory.
    let mut days = Vec::with_capacity(args.len());
    let mut month = opened_month;
    for raw in args {
        let day = parse_day_expr(raw, today, month)?;
        month = MonthKey::from_day(&day).with_context(|| format!("cannot toggle {raw}"))?;
        days.push((day, month));
    }

    for (day, month) in days {
        if editor.current_month() != month {
            editor.set_current_month(month);
        }

        match editor.toggle_day(&day, today) {
            Some(toggle) => {
                store.append_edit(&toggle.to_edit(editor.current_month()))?;
                let verb = match toggle {
                    DayToggle::Blocked(_) => "blocked",
                    DayToggle::Allowed(_) => "allowed",
                };
                println!("{verb} {}", format_day(toggle.day()));
            }
            None => {
                let status = classify(&day, today, editor.current_changes());
                warn!(day = %day, status = status.as_key(), "day cannot be toggled");
                println!("unchanged {} ({})", format_day(day), status.as_key());
            }
        }
    }

    if editor.current_month() != opened_month {
        store.set_current_month(editor.current_month())?;
    }
    if !editor.is_pristine() {
        store.save_calendar(&editor.changes().to_snapshot())?;
        info!(month = %editor.current_month(), "saved availability snapshot");
    }
    Ok(())
}

#[instrument(skip(store, args))]
fn cmd_status(store: &DataStore, args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    let session = Session::open(store, today)?;
    let days = if args.is_empty() {
        vec![today]
    } else {
        args.iter()
            .map(|raw| parse_day_expr(raw, today, session.editor.current_month()))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    for day in days {
        let changes = session.editor.changes().month(MonthKey::from_day(&day)?);
        let status = classify(&day, today, changes);
        println!("{} {}", format_day(day), status.as_key());
    }
    Ok(())
}

#[instrument(skip(store))]
fn cmd_submit(store: &DataStore, today: NaiveDate) -> anyhow::Result<()> {
    let mut session = Session::open(store, today)?;
    let update = session.panel.submit(&mut session.editor);

    let mut listing = session.panel.listing().clone();
    listing.availability_plan = Some(update.availability_plan.clone());
    store.save_listing(&listing)?;
    info!(plan_type = %update.availability_plan.plan_type, "saved listing availability plan");

    println!("{}", serde_json::to_string_pretty(&update)?);
    Ok(())
}

#[instrument(skip(store, renderer))]
fn cmd_plan(store: &DataStore, renderer: &mut Renderer, today: NaiveDate) -> anyhow::Result<()> {
    let session = Session::open(store, today)?;
    renderer.print_plan(session.editor.plan())
}

#[instrument(skip(renderer, args))]
fn cmd_filter(renderer: &mut Renderer, args: &[String], today: NaiveDate) -> anyhow::Result<()> {
    let mut filter = BookingDateRangeFilter::new(FilterConfig::default(), None);
    let month = MonthKey::from_day(&today)?;

    let submission = match args {
        [flag] if flag == "--clear" => filter.clear(),
        [start, end] => {
            let start = parse_day_expr(start, today, month)?;
            let end = parse_day_expr(end, today, month)?;
            filter.toggle_open();
            match filter.select(start, end)? {
                Some(submission) => submission,
                None => filter.apply(),
            }
        }
        _ => return Err(anyhow!("usage: filter <start> <end> | filter --clear")),
    };

    let label = renderer.messages().format(&filter.label());
    renderer.print_line(&submission.query_pair())?;
    renderer.print_line(&label)
}

#[instrument(skip(store, renderer))]
fn cmd_title(store: &DataStore, renderer: &mut Renderer, today: NaiveDate) -> anyhow::Result<()> {
    let session = Session::open(store, today)?;
    let title = renderer.messages().format(&session.panel.title());
    renderer.print_line(&title)
}

fn cmd_commands() -> anyhow::Result<()> {
    for command in known_command_names() {
        println!("{command}");
    }
    Ok(())
}

fn cmd_help() -> anyhow::Result<()> {
    println!(
        "Commands: show [YYYY-MM], month <YYYY-MM|next|prev|today>, toggle <day>..., status [day]..., submit, plan, filter <start> <end> | --clear, title"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_prefix_expands() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("sho", &known), Some("show"));
        assert_eq!(expand_command_abbrev("ti", &known), Some("title"));
        assert_eq!(expand_command_abbrev("_c", &known), Some("_commands"));
    }

    #[test]
    fn ambiguous_prefix_is_rejected() {
        let known = known_command_names();
        assert_eq!(expand_command_abbrev("s", &known), None);
        assert_eq!(expand_command_abbrev("t", &known), None);
        assert_eq!(expand_command_abbrev("zzz", &known), None);
    }
}
