use chrono::{NaiveTime, Timelike};

use super::{Schedule, Status, SLOTS_PER_DAY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeLeft {
    pub hours: u32,
    pub minutes: u32,
}

impl TimeLeft {
    pub fn total_minutes(&self) -> u32 {
        self.hours * 60 + self.minutes
    }
}

/// What the schedule says about `now` and the next change after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub current: Status,
    pub next_status: Status,
    /// Whole-hour offset of the first slot with a different status, 0 if none.
    pub hours_until_change: u32,
    pub time_left: TimeLeft,
}

impl Projection {
    /// True when every slot has the same status and nothing will change.
    pub fn is_steady(&self) -> bool {
        self.hours_until_change == 0
    }
}

/// Walk forward from the current hour, wrapping past midnight, to the first slot
/// whose status differs. Time left counts the rest of the current hour plus the
/// full hours in between. A uniform schedule yields zero time left.
pub fn project(schedule: &Schedule, now: NaiveTime) -> Projection {
    let hour = now.hour() as usize;
    let current = schedule.status_at(hour);

    let change = (1..SLOTS_PER_DAY)
        .map(|offset| (offset, schedule.status_at(hour + offset)))
        .find(|(_, status)| *status != current);

    let Some((offset, next_status)) = change else {
        return Projection {
            current,
            next_status: current,
            hours_until_change: 0,
            time_left: TimeLeft::default(),
        };
    };

    let minutes_left_in_hour = 60 - now.minute();
    let total = (offset as u32 - 1) * 60 + minutes_left_in_hour;

    Projection {
        current,
        next_status,
        hours_until_change: offset as u32,
        time_left: TimeLeft {
            hours: total / 60,
            minutes: total % 60,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn all_available_is_steady() {
        let projection = project(&Schedule::default(), at(13, 20));

        assert_eq!(projection.current, Status::Available);
        assert_eq!(projection.next_status, Status::Available);
        assert!(projection.is_steady());
        assert_eq!(projection.time_left, TimeLeft::default());
    }

    #[test]
    fn all_unavailable_is_steady() {
        let schedule = Schedule::all(Status::Unavailable);
        let projection = project(&schedule, at(5, 30));

        assert_eq!(projection.current, Status::Unavailable);
        assert_eq!(projection.hours_until_change, 0);
        assert_eq!(projection.time_left.total_minutes(), 0);
    }

    #[test]
    fn change_in_the_next_hour() {
        let mut schedule = Schedule::default();
        schedule.set(10, Status::Unavailable);

        let projection = project(&schedule, at(9, 45));

        assert_eq!(projection.current, Status::Available);
        assert_eq!(projection.next_status, Status::Unavailable);
        assert_eq!(projection.hours_until_change, 1);
        assert_eq!(projection.time_left.total_minutes(), 15);
    }

    #[test]
    fn change_several_hours_ahead() {
        let mut schedule = Schedule::default();
        schedule.set(18, Status::Unavailable);

        let projection = project(&schedule, at(14, 0));

        assert_eq!(projection.hours_until_change, 4);
        assert_eq!(projection.time_left, TimeLeft { hours: 4, minutes: 0 });
    }

    #[test]
    fn wraps_past_midnight() {
        let mut schedule = Schedule::all(Status::Unavailable);
        schedule.set(1, Status::Available);

        let projection = project(&schedule, at(22, 10));

        assert_eq!(projection.current, Status::Unavailable);
        assert_eq!(projection.next_status, Status::Available);
        assert_eq!(projection.hours_until_change, 3);
        assert_eq!(projection.time_left, TimeLeft { hours: 2, minutes: 50 });
    }

    #[test]
    fn uncertain_counts_as_a_change() {
        let mut schedule = Schedule::default();
        schedule.set(3, Status::Uncertain);

        let projection = project(&schedule, at(2, 59));

        assert_eq!(projection.next_status, Status::Uncertain);
        assert_eq!(projection.time_left.total_minutes(), 1);
    }

    #[test]
    fn change_right_before_current_hour_wraps_fully() {
        let mut schedule = Schedule::default();
        schedule.set(8, Status::Unavailable);

        let projection = project(&schedule, at(9, 0));

        assert_eq!(projection.hours_until_change, 23);
        assert_eq!(projection.time_left, TimeLeft { hours: 23, minutes: 0 });
    }
}
