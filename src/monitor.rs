//! Interactive Monitor
//!
//! Reads one command per line from stdin and re-renders the status card on a
//! fixed tick. Both run on one task, so state changes are strictly serialized.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use log::{debug, info, warn};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::bulletin;
use crate::groups::{AppState, StateError};
use crate::store::{load_state, save_state, KeyValueStore};
use crate::view;

pub const HELP: &str = "\
Commands:
  status            show the current status
  groups            list groups (* = selected)
  select <id>       switch to another group
  edit              toggle edit mode
  toggle <hour>     cycle one hour: on -> off -> maybe (edit mode)
  apply <ranges>    replace the schedule, e.g. apply 00-04, 12-16 (edit mode)
  reset             mark every hour as on (edit mode)
  add [name]        create a group (edit mode)
  rename <name>     rename the selected group (edit mode)
  delete            delete the selected group (edit mode)
  import <file>     load the newest announcement from a file (edit mode)
  help              show this text
  quit              exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Groups,
    Select(u64),
    Edit,
    Toggle(usize),
    Apply(String),
    Reset,
    Add(Option<String>),
    Rename(String),
    Delete,
    Import(PathBuf),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("not a number: {0}")]
    BadNumber(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let required = |command: &'static str| {
            if rest.is_empty() {
                Err(CommandError::MissingArgument(command))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match name.to_lowercase().as_str() {
            "" | "status" => Command::Status,
            "groups" => Command::Groups,
            "select" => Command::Select(parse_number(&required("select")?)?),
            "edit" => Command::Edit,
            "toggle" => Command::Toggle(parse_number(&required("toggle")?)?),
            "apply" => Command::Apply(required("apply")?),
            "reset" => Command::Reset,
            "add" => Command::Add((!rest.is_empty()).then(|| rest.to_string())),
            "rename" => Command::Rename(required("rename")?),
            "delete" => Command::Delete,
            "import" => Command::Import(PathBuf::from(required("import")?)),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }

    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Toggle(_)
                | Command::Apply(_)
                | Command::Reset
                | Command::Add(_)
                | Command::Rename(_)
                | Command::Delete
                | Command::Import(_)
        )
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::BadNumber(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Monitor<S: KeyValueStore> {
    state: AppState,
    store: S,
}

impl<S: KeyValueStore> Monitor<S> {
    pub fn new(store: S) -> Self {
        let state = load_state(&store);
        info!("Loaded {} group(s)", state.groups().len());
        Self { state, store }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Redraw for the periodic tick.
    pub fn refresh(&self, now: NaiveDateTime) -> String {
        view::render_screen(&self.state, now.time())
    }

    /// Apply one command and return the text to show.
    pub fn handle(&mut self, command: Command, now: NaiveDateTime) -> (String, Flow) {
        debug!("Handling {:?}", command);
        let mutates = command.mutates();
        let now_ms = u64::try_from(now.and_utc().timestamp_millis()).unwrap_or(0);

        let result: Result<Option<String>, StateError> = match command {
            Command::Status => Ok(None),
            Command::Groups => return (view::render_groups(&self.state), Flow::Continue),
            Command::Help => return (HELP.to_string(), Flow::Continue),
            Command::Quit => return ("Bye.".to_string(), Flow::Quit),
            Command::Select(id) => self.state.select_group(id).map(|_| None),
            Command::Edit => {
                let mode = self.state.toggle_mode();
                Ok(Some(format!("Mode: {:?}", mode)))
            }
            Command::Toggle(hour) => self.state.toggle_hour(hour).map(|_| None),
            Command::Apply(text) => self.state.apply_text(&text).map(|_| None),
            Command::Reset => self.state.reset_active_schedule().map(|_| None),
            Command::Add(name) => self
                .state
                .add_group(name.as_deref(), now_ms)
                .map(|id| Some(format!("Created group {}", id))),
            Command::Rename(name) => self.state.rename_active_group(&name).map(|_| None),
            Command::Delete => self
                .state
                .delete_active_group()
                .map(|g| Some(format!("Deleted {}", g.name))),
            Command::Import(path) => {
                if !self.state.is_editing() {
                    Err(StateError::NotEditing)
                } else {
                    match bulletin::from_file(&path, now.date()) {
                        Ok(Some(b)) => self.state.apply_bulletin(&b, now_ms).map(|n| {
                            Some(format!(
                                "Schedule for {}: updated {} group(s)",
                                b.date.format("%d.%m.%Y"),
                                n
                            ))
                        }),
                        Ok(None) => return ("No schedule found.".to_string(), Flow::Continue),
                        Err(e) => return (format!("Import failed: {:#}", e), Flow::Continue),
                    }
                }
            }
        };

        match result {
            Ok(note) => {
                if mutates {
                    self.persist();
                }
                let screen = view::render_screen(&self.state, now.time());
                let text = match note {
                    Some(note) => format!("{}\n{}", note, screen),
                    None => screen,
                };
                (text, Flow::Continue)
            }
            Err(e) => (format!("Rejected: {}", e), Flow::Continue),
        }
    }

    fn persist(&self) {
        if let Err(e) = save_state(&self.store, &self.state) {
            warn!("Failed to save groups: {}", e);
        }
    }
}

/// Serve stdin commands and periodic redraws until `quit` or end of input.
pub async fn run<S: KeyValueStore>(mut monitor: Monitor<S>, tick: Duration) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    println!("{}", HELP);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                println!("{}", monitor.refresh(Local::now().naive_local()));
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    info!("Input closed");
                    break;
                };
                match Command::parse(&line) {
                    Ok(command) => {
                        let (text, flow) = monitor.handle(command, Local::now().naive_local());
                        println!("{}", text);
                        if flow == Flow::Quit {
                            break;
                        }
                    }
                    Err(e) => println!("{}\n{}", e, HELP),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::Mode;
    use crate::schedule::Status;
    use crate::store::{MemoryStore, STATE_KEY};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 29)
            .unwrap()
            .and_hms_opt(9, 45, 0)
            .unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(""), Ok(Command::Status));
        assert_eq!(Command::parse("  TOGGLE 7 "), Ok(Command::Toggle(7)));
        assert_eq!(
            Command::parse("apply 00-04, 12-16"),
            Ok(Command::Apply("00-04, 12-16".to_string()))
        );
        assert_eq!(Command::parse("add"), Ok(Command::Add(None)));
        assert_eq!(
            Command::parse("add Kitchen"),
            Ok(Command::Add(Some("Kitchen".to_string())))
        );
        assert_eq!(Command::parse("select 12"), Ok(Command::Select(12)));
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_commands() {
        assert_eq!(
            Command::parse("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
        assert_eq!(
            Command::parse("toggle"),
            Err(CommandError::MissingArgument("toggle"))
        );
        assert_eq!(
            Command::parse("toggle noon"),
            Err(CommandError::BadNumber("noon".to_string()))
        );
    }

    #[test]
    fn edits_are_persisted() {
        let mut monitor = Monitor::new(MemoryStore::default());

        monitor.handle(Command::Edit, now());
        let (text, flow) = monitor.handle(Command::Apply("10-12".to_string()), now());

        assert_eq!(flow, Flow::Continue);
        assert!(text.contains("Outage in 15m"));

        let saved = monitor.store.get(STATE_KEY).unwrap().unwrap();
        assert!(saved.contains(r#""off""#));
    }

    #[test]
    fn rejected_commands_do_not_persist() {
        let mut monitor = Monitor::new(MemoryStore::default());

        let (text, _) = monitor.handle(Command::Toggle(3), now());
        assert!(text.starts_with("Rejected"));
        assert_eq!(monitor.store.get(STATE_KEY).unwrap(), None);
        assert_eq!(monitor.state().mode(), Mode::View);
    }

    #[test]
    fn state_survives_restart() {
        let store = MemoryStore::default();
        let mut monitor = Monitor::new(store);
        monitor.handle(Command::Edit, now());
        monitor.handle(Command::Toggle(0), now());
        monitor.handle(Command::Add(Some("Office".to_string())), now());

        let restarted = Monitor::new(monitor.store);
        assert_eq!(restarted.state().groups().len(), 2);
        assert_eq!(
            restarted.state().active_group().schedule.status_at(0),
            Status::Unavailable
        );
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut monitor = Monitor::new(MemoryStore::default());
        assert_eq!(monitor.handle(Command::Quit, now()).1, Flow::Quit);
    }

    #[test]
    fn import_in_view_mode_is_rejected() {
        let mut monitor = Monitor::new(MemoryStore::default());

        let (text, flow) = monitor.handle(
            Command::Import(PathBuf::from("/nonexistent/lumina/announcements.txt")),
            now(),
        );
        assert_eq!(flow, Flow::Continue);
        assert!(text.starts_with("Rejected"));
        assert_eq!(monitor.store.get(STATE_KEY).unwrap(), None);
        assert_eq!(monitor.state().groups().len(), 1);
    }

    #[test]
    fn import_of_missing_file_reports_error() {
        let mut monitor = Monitor::new(MemoryStore::default());
        monitor.handle(Command::Edit, now());

        let (text, flow) = monitor.handle(
            Command::Import(PathBuf::from("/nonexistent/lumina/announcements.txt")),
            now(),
        );
        assert_eq!(flow, Flow::Continue);
        assert!(text.starts_with("Import failed"));
    }
}
