//! Hourly Availability Schedule
//!
//! A day is split into 24 one-hour slots, each carrying the power status for
//! `[hour, hour + 1)`.

mod parser;
mod projector;

pub use parser::{parse, scan_intervals};
pub use projector::{project, Projection, TimeLeft};

use serde::{Deserialize, Serialize};

pub const SLOTS_PER_DAY: usize = 24;

/// Power status of a single slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "on")]
    Available,
    #[serde(rename = "off")]
    Unavailable,
    #[serde(rename = "maybe")]
    Uncertain,
}

impl Status {
    /// Next state in the edit cycle: Available -> Unavailable -> Uncertain -> Available.
    pub fn cycled(self) -> Self {
        match self {
            Status::Available => Status::Unavailable,
            Status::Unavailable => Status::Uncertain,
            Status::Uncertain => Status::Available,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule([Status; SLOTS_PER_DAY]);

impl Default for Schedule {
    fn default() -> Self {
        Self::all(Status::Available)
    }
}

impl Schedule {
    pub fn all(status: Status) -> Self {
        Self([status; SLOTS_PER_DAY])
    }

    /// Status of `hour`, wrapping past midnight.
    pub fn status_at(&self, hour: usize) -> Status {
        self.0[hour % SLOTS_PER_DAY]
    }

    pub fn slots(&self) -> &[Status; SLOTS_PER_DAY] {
        &self.0
    }

    /// Returns `None` for hours outside the day.
    pub fn set(&mut self, hour: usize, status: Status) -> Option<()> {
        let slot = self.0.get_mut(hour)?;
        *slot = status;
        Some(())
    }

    /// Advances one slot through the edit cycle and returns its new status.
    pub fn toggle(&mut self, hour: usize) -> Option<Status> {
        let slot = self.0.get_mut(hour)?;
        *slot = slot.cycled();
        Some(*slot)
    }

    /// Hours currently marked as off.
    pub fn unavailable_hours(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == Status::Unavailable)
            .map(|(hour, _)| hour)
            .collect()
    }

    /// Writes the off hours back out as `HH-HH` ranges that [`parse`] accepts.
    ///
    /// Only `Unavailable` runs are expressible; `Uncertain` slots are dropped, so
    /// parsing the result restores the off hours but not the uncertain ones.
    pub fn to_interval_text(&self) -> String {
        let mut ranges = Vec::new();
        let mut hour = 0;

        while hour < SLOTS_PER_DAY {
            if self.0[hour] != Status::Unavailable {
                hour += 1;
                continue;
            }
            let start = hour;
            while hour < SLOTS_PER_DAY && self.0[hour] == Status::Unavailable {
                hour += 1;
            }
            ranges.push(format!("{:02}-{:02}", start, hour));
        }

        ranges.join(", ")
    }
}
