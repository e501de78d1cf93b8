//! Outage Announcement Import
//!
//! Pulls the per-queue outage hours out of published announcements such as
//! "Графік відключень на 29 січня: Черга 1.1: 00-04, 12-16; Черга 1.2: 04-08".

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use log::{debug, info};
use regex::Regex;

/// Words that mark a message as an outage schedule.
const KEYWORDS: [&str; 3] = ["гпв", "графік", "відключень"];

/// Genitive month names as they appear after a day number.
const MONTHS: [(&str, u32); 12] = [
    ("січня", 1),
    ("лютого", 2),
    ("березня", 3),
    ("квітня", 4),
    ("травня", 5),
    ("червня", 6),
    ("липня", 7),
    ("серпня", 8),
    ("вересня", 9),
    ("жовтня", 10),
    ("листопада", 11),
    ("грудня", 12),
];

pub const MESSAGE_SEPARATOR: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bulletin {
    pub date: NaiveDate,
    /// Queue id (`"1"`, `"1.1"`) and interval text accepted by the schedule
    /// parser, in the order the queues first appear in the announcement.
    pub queues: Vec<(String, String)>,
}

impl Bulletin {
    pub fn queue(&self, id: &str) -> Option<&str> {
        self.queues
            .iter()
            .find(|(queue, _)| queue == id)
            .map(|(_, times)| times.as_str())
    }
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").unwrap())
}

fn space_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn month_date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let names: Vec<&str> = MONTHS.iter().map(|(name, _)| *name).collect();
        Regex::new(&format!(r"(\d{{1,2}})\s+({})", names.join("|"))).unwrap()
    })
}

fn short_date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2})\.(\d{1,2})").unwrap())
}

fn queue_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:Черга|Група)?\s*(\d(?:\.\d)?)\s*[\-:)]\s*([\d:\s\-–,;]+)").unwrap()
    })
}

/// Turn message HTML into one line of plain text.
pub fn clean_text(raw: &str) -> String {
    let text = raw.replace("<br>", "\n").replace("<br/>", "\n");
    let text = tag_pattern().replace_all(&text, "");
    space_pattern().replace_all(&text, " ").trim().to_string()
}

/// Newest announcement with a date and at least one queue. `messages` are in
/// publication order, oldest first.
pub fn extract_latest<S: AsRef<str>>(messages: &[S], today: NaiveDate) -> Option<Bulletin> {
    for message in messages.iter().rev() {
        let text = clean_text(message.as_ref());
        let lower = text.to_lowercase();

        if !KEYWORDS.iter().any(|k| lower.contains(k)) {
            continue;
        }

        let Some(date) = find_date(&text, &lower, today) else {
            debug!("Skipping announcement without a date");
            continue;
        };

        let queues = extract_queues(&text);
        if queues.is_empty() {
            continue;
        }

        info!("Found schedule for {} ({} queues)", date.format("%d.%m.%Y"), queues.len());
        return Some(Bulletin { date, queues });
    }

    None
}

/// Queue id and normalized interval text, e.g. `("1.1", "00 - 04, 12 - 16")`.
/// A repeated queue keeps its first position and takes the later times.
pub fn extract_queues(text: &str) -> Vec<(String, String)> {
    let mut queues: Vec<(String, String)> = Vec::new();

    for captures in queue_pattern().captures_iter(text) {
        let times = &captures[2];
        if !times.chars().any(|c| c.is_ascii_digit()) {
            continue;
        }
        let times = normalize_times(times);
        match queues.iter_mut().find(|(queue, _)| queue == &captures[1]) {
            Some(entry) => entry.1 = times,
            None => queues.push((captures[1].to_string(), times)),
        }
    }

    queues
}

/// Read a file of messages separated by `---` lines.
pub fn from_file(path: impl AsRef<Path>, today: NaiveDate) -> Result<Option<Bulletin>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read announcements from {}", path.display()))?;
    Ok(extract_latest(&split_messages(&text), today))
}

pub fn split_messages(text: &str) -> Vec<String> {
    let mut messages = Vec::new();
    let mut current = Vec::new();

    for line in text.lines() {
        if line.trim() == MESSAGE_SEPARATOR {
            messages.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    messages.push(current.join("\n"));

    messages.retain(|m| !m.trim().is_empty());
    messages
}

fn find_date(text: &str, lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(captures) = month_date_pattern().captures(lower) {
        let day: u32 = captures[1].parse().ok()?;
        let month = MONTHS
            .iter()
            .find(|(name, _)| *name == &captures[2])
            .map(|(_, number)| *number)?;

        // announcements for early January go out in late December and vice versa
        let year = match (month, today.month()) {
            (1, 12) => today.year() + 1,
            (12, 1) => today.year() - 1,
            _ => today.year(),
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let captures = short_date_pattern().captures(text)?;
    let day: u32 = captures[1].parse().ok()?;
    let month: u32 = captures[2].parse().ok()?;
    NaiveDate::from_ymd_opt(today.year(), month, day)
}

/// Unify dashes and separators to `H - H, H - H`. Leading and trailing
/// separators are dropped along with whitespace.
fn normalize_times(raw: &str) -> String {
    let unified = raw
        .replace(['–', '—'], "-")
        .replace(';', ",");

    let compact: String = unified
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ':' | '-' | ','))
        .collect();

    compact
        .replace('-', " - ")
        .replace(',', ", ")
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}
