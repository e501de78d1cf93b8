//! Groups and Application State
//!
//! Holds every schedule group, which one is selected and whether the user is
//! editing. All user actions go through [`AppState`]; rejected actions leave the
//! state untouched.

use chrono::NaiveTime;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bulletin::Bulletin;
use crate::schedule::{self, Projection, Schedule, SLOTS_PER_DAY};

pub const DEFAULT_GROUP_ID: u64 = 1;
pub const DEFAULT_GROUP_NAME: &str = "My Schedule";
pub const QUEUE_GROUP_PREFIX: &str = "Queue";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub schedule: Schedule,
}

impl Group {
    pub fn new(id: u64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            schedule: Schedule::default(),
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_ID, DEFAULT_GROUP_NAME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    View,
    Edit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("switch to edit mode first")]
    NotEditing,
    #[error("the last group cannot be deleted")]
    LastGroup,
    #[error("no group with id {0}")]
    UnknownGroup(u64),
    #[error("hour {0} is outside 0-23")]
    HourOutOfRange(usize),
    #[error("group name cannot be empty")]
    EmptyName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    groups: Vec<Group>,
    active_id: u64,
    mode: Mode,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            groups: vec![Group::default()],
            active_id: DEFAULT_GROUP_ID,
            mode: Mode::View,
        }
    }

    /// Rebuild state from persisted groups. Keeps the first group of any
    /// duplicated id and falls back to the default group when nothing is left.
    pub fn from_groups(groups: Vec<Group>) -> Self {
        let mut unique: Vec<Group> = Vec::with_capacity(groups.len());
        for group in groups {
            if unique.iter().any(|g| g.id == group.id) {
                debug!("Dropping duplicate group id {}", group.id);
                continue;
            }
            unique.push(group);
        }

        let Some(active_id) = unique.first().map(|g| g.id) else {
            return Self::new();
        };
        Self {
            groups: unique,
            active_id,
            mode: Mode::View,
        }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn active_id(&self) -> u64 {
        self.active_id
    }

    pub fn active_group(&self) -> &Group {
        // active_id always names an existing group
        self.groups
            .iter()
            .find(|g| g.id == self.active_id)
            .unwrap_or(&self.groups[0])
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Edit
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::View => Mode::Edit,
            Mode::Edit => Mode::View,
        };
        self.mode
    }

    pub fn select_group(&mut self, id: u64) -> Result<(), StateError> {
        if !self.groups.iter().any(|g| g.id == id) {
            return Err(StateError::UnknownGroup(id));
        }
        self.active_id = id;
        Ok(())
    }

    /// Append a group with an all-available schedule. `now_ms` seeds the id.
    pub fn add_group(&mut self, name: Option<&str>, now_ms: u64) -> Result<u64, StateError> {
        self.require_edit()?;
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Group {}", self.groups.len() + 1),
        };
        Ok(self.push_group(&name, now_ms))
    }

    /// Delete the selected group and select the first remaining one.
    pub fn delete_active_group(&mut self) -> Result<Group, StateError> {
        self.require_edit()?;
        if self.groups.len() <= 1 {
            return Err(StateError::LastGroup);
        }

        let index = self.active_index();
        let removed = self.groups.remove(index);
        self.active_id = self.groups[0].id;
        info!("Deleted group {} ({})", removed.id, removed.name);
        Ok(removed)
    }

    pub fn rename_active_group(&mut self, name: &str) -> Result<(), StateError> {
        self.require_edit()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(StateError::EmptyName);
        }
        let index = self.active_index();
        self.groups[index].name = name.to_string();
        Ok(())
    }

    pub fn toggle_hour(&mut self, hour: usize) -> Result<(), StateError> {
        self.require_edit()?;
        if hour >= SLOTS_PER_DAY {
            return Err(StateError::HourOutOfRange(hour));
        }
        let index = self.active_index();
        self.groups[index].schedule.toggle(hour);
        Ok(())
    }

    /// Replace the selected schedule with the ranges parsed from `text`.
    pub fn apply_text(&mut self, text: &str) -> Result<(), StateError> {
        self.require_edit()?;
        let index = self.active_index();
        self.groups[index].schedule = schedule::parse(text);
        Ok(())
    }

    pub fn reset_active_schedule(&mut self) -> Result<(), StateError> {
        self.require_edit()?;
        let index = self.active_index();
        self.groups[index].schedule = Schedule::default();
        Ok(())
    }

    /// Write each queue of an announcement into the group named after it,
    /// creating missing groups. Returns how many groups were updated.
    pub fn apply_bulletin(&mut self, bulletin: &Bulletin, now_ms: u64) -> Result<usize, StateError> {
        self.require_edit()?;

        for (queue, times) in &bulletin.queues {
            let name = format!("{} {}", QUEUE_GROUP_PREFIX, queue);
            let index = match self.groups.iter().position(|g| g.name == name) {
                Some(index) => index,
                None => {
                    self.push_group(&name, now_ms);
                    self.groups.len() - 1
                }
            };
            self.groups[index].schedule = schedule::parse(times);
            debug!("{} <- {}", name, times);
        }

        info!(
            "Applied bulletin for {} to {} group(s)",
            bulletin.date,
            bulletin.queues.len()
        );
        Ok(bulletin.queues.len())
    }

    pub fn projection(&self, now: NaiveTime) -> Projection {
        schedule::project(&self.active_group().schedule, now)
    }

    fn push_group(&mut self, name: &str, now_ms: u64) -> u64 {
        let max_id = self.groups.iter().map(|g| g.id).max().unwrap_or(0);
        let id = if now_ms > max_id { now_ms } else { max_id + 1 };
        self.groups.push(Group::new(id, name));
        info!("Created group {} ({})", id, name);
        id
    }

    fn active_index(&self) -> usize {
        self.groups
            .iter()
            .position(|g| g.id == self.active_id)
            .unwrap_or(0)
    }

    fn require_edit(&self) -> Result<(), StateError> {
        if self.is_editing() {
            Ok(())
        } else {
            Err(StateError::NotEditing)
        }
    }
}
