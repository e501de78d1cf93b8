//! Text rendering of the status card, hour grid and group tabs.

use chrono::{NaiveTime, Timelike};

use crate::groups::{AppState, Mode};
use crate::schedule::{Schedule, Status, TimeLeft, SLOTS_PER_DAY};

pub const CARD_WIDTH: usize = 50;
const GRID_COLUMNS: usize = 6;

fn headline(status: Status) -> &'static str {
    match status {
        Status::Available => "POWER ON",
        Status::Unavailable => "POWER OFF",
        Status::Uncertain => "POSSIBLY OFF",
    }
}

fn glyph(status: Status) -> char {
    match status {
        Status::Available => '+',
        Status::Unavailable => '-',
        Status::Uncertain => '?',
    }
}

pub fn format_duration(time_left: TimeLeft) -> String {
    match (time_left.hours, time_left.minutes) {
        (h, m) if h > 0 && m > 0 => format!("{}h {}m", h, m),
        (h, _) if h > 0 => format!("{}h", h),
        (_, m) => format!("{}m", m),
    }
}

/// Headline, clock and countdown for the selected group.
pub fn render_status(state: &AppState, now: NaiveTime) -> String {
    let group = state.active_group();
    let projection = state.projection(now);
    let mode = match state.mode() {
        Mode::View => "[VIEW]",
        Mode::Edit => "[EDIT]",
    };

    let countdown = if projection.is_steady() {
        "No change today".to_string()
    } else {
        // anything other than an outage ahead reads as power coming back
        let label = if projection.next_status == Status::Unavailable {
            "Outage in"
        } else {
            "Power back in"
        };
        format!("{} {}", label, format_duration(projection.time_left))
    };

    let clock = now.format("%H:%M").to_string();
    let name_width = CARD_WIDTH - mode.len();
    let status_width = CARD_WIDTH - clock.len();

    [
        "=".repeat(CARD_WIDTH),
        format!("{:<name_width$}{}", group.name, mode),
        format!("{:<status_width$}{}", headline(projection.current), clock),
        countdown,
        "=".repeat(CARD_WIDTH),
    ]
    .join("\n")
}

/// Four rows of six hours. The current hour is bracketed.
pub fn render_grid(schedule: &Schedule, current_hour: u32) -> String {
    let cells: Vec<String> = (0..SLOTS_PER_DAY)
        .map(|hour| {
            let g = glyph(schedule.status_at(hour));
            if hour == current_hour as usize {
                format!("[{:02}:00 {}]", hour, g)
            } else {
                format!(" {:02}:00 {} ", hour, g)
            }
        })
        .collect();

    let mut lines: Vec<String> = cells
        .chunks(GRID_COLUMNS)
        .map(|row| row.join(" "))
        .collect();
    lines.push("+ on   - off   ? maybe".to_string());
    lines.join("\n")
}

pub fn render_groups(state: &AppState) -> String {
    state
        .groups()
        .iter()
        .map(|g| {
            let marker = if g.id == state.active_id() { '*' } else { ' ' };
            format!("{} {:>13}  {}", marker, g.id, g.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Card and grid together, as shown after every change and tick.
pub fn render_screen(state: &AppState, now: NaiveTime) -> String {
    format!(
        "{}\n{}",
        render_status(state, now),
        render_grid(&state.active_group().schedule, now.hour())
    )
}
