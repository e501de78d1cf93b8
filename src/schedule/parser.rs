//! Free-text outage schedule parser
//!
//! Accepts text such as `"00-04, 12:00 – 16:00"` and marks every hour covered by
//! a range as off. Anything that does not look like a range is skipped.

use log::debug;

use super::{Schedule, Status, SLOTS_PER_DAY};

const DASHES: [char; 3] = ['-', '\u{2013}', '\u{2014}'];
const DAY_END: u32 = SLOTS_PER_DAY as u32;

/// Parse outage ranges into a schedule. Never fails: unmatched text leaves the
/// all-available default untouched.
pub fn parse(text: &str) -> Schedule {
    let mut schedule = Schedule::default();
    let mut ranges = 0;

    for line in text.lines() {
        for (start, end) in scan_intervals(line) {
            let (start, end) = normalize(start, end);
            for hour in start..end.min(DAY_END) {
                schedule.set(hour as usize, Status::Unavailable);
            }
            ranges += 1;
        }
    }

    debug!("Parsed {} outage range(s)", ranges);
    schedule
}

/// Raw `(start, end)` hour pairs found in one line, left to right.
///
/// A range is `H[:MM]`, optional whitespace, a hyphen, en dash or em dash,
/// optional whitespace, `H[:MM]`, where `H` is one or two digits. Minutes are
/// consumed but not reported.
pub fn scan_intervals(line: &str) -> Vec<(u32, u32)> {
    let chars: Vec<char> = line.chars().collect();
    let mut intervals = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        match match_interval(&chars, pos) {
            Some((interval, next)) => {
                intervals.push(interval);
                pos = next;
            }
            None => pos += 1,
        }
    }

    intervals
}

/// Hours past the end of the day wrap to midnight, and an end of midnight
/// means "until the end of the day" unless the range also starts at midnight.
fn normalize(start: u32, end: u32) -> (u32, u32) {
    let start = if start >= DAY_END { 0 } else { start };
    let mut end = if end > DAY_END { 0 } else { end };
    if end == 0 && start != 0 {
        end = DAY_END;
    }
    (start, end)
}

fn match_interval(chars: &[char], at: usize) -> Option<((u32, u32), usize)> {
    let (start, pos) = read_hour(chars, at)?;
    let pos = skip_minutes(chars, pos);
    let pos = skip_whitespace(chars, pos);

    if !chars.get(pos).is_some_and(|c| DASHES.contains(c)) {
        return None;
    }

    let pos = skip_whitespace(chars, pos + 1);
    let (end, pos) = read_hour(chars, pos)?;
    let pos = skip_minutes(chars, pos);

    Some(((start, end), pos))
}

/// One or two ASCII digits, greedy.
fn read_hour(chars: &[char], at: usize) -> Option<(u32, usize)> {
    let mut value = 0;
    let mut pos = at;

    while pos < chars.len() && pos - at < 2 {
        match chars[pos].to_digit(10) {
            Some(digit) => value = value * 10 + digit,
            None => break,
        }
        pos += 1;
    }

    (pos > at).then_some((value, pos))
}

fn skip_minutes(chars: &[char], at: usize) -> usize {
    let is_digit = |i: usize| chars.get(i).is_some_and(|c| c.is_ascii_digit());
    if chars.get(at) == Some(&':') && is_digit(at + 1) && is_digit(at + 2) {
        at + 3
    } else {
        at
    }
}

fn skip_whitespace(chars: &[char], mut at: usize) -> usize {
    while chars.get(at).is_some_and(|c| c.is_whitespace()) {
        at += 1;
    }
    at
}
