//! # Wall-clock trigger.
//!
//! [`At`] fires at a specific time of day in a named IANA timezone — every day
//! by default, or on one weekday per week via [`DayRule`]. The next occurrence
//! is computed in the target zone, so the trigger tracks local wall-clock time
//! across DST shifts; instants that fall into a DST gap resolve to the
//! earliest valid time after it.
//!
//! ## Example
//! ```rust
//! use chime::At;
//! use chrono::Weekday;
//! use chrono_tz::Tz;
//!
//! // 12:30:00 every Monday, Kolkata time
//! let at = At::new(12, 30, 0, Tz::Asia__Kolkata).on_weekday(Weekday::Mon);
//! assert!(at.validate().is_ok());
//! ```

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, LocalResult, NaiveDateTime, NaiveTime, TimeDelta, Utc, Weekday};
use chrono::{Datelike, TimeZone};
use chrono_tz::Tz;

use crate::error::TriggerError;

/// Which days an [`At`] trigger fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayRule {
    /// Fire every day.
    #[default]
    Daily,
    /// Fire once a week, on the given weekday.
    Weekly(Weekday),
}

/// Fires daily (or weekly) at a wall-clock instant in a named timezone.
#[derive(Debug, Clone)]
pub struct At {
    hour: u8,
    minute: u8,
    second: u8,
    day: DayRule,
    tz: Tz,
    max_runs: Option<u64>,
    runs: u64,
    next_at: Option<DateTime<Utc>>,
}

impl At {
    /// Creates a trigger firing every day at `hour:minute:second` in `tz`.
    pub fn new(hour: u8, minute: u8, second: u8, tz: Tz) -> Self {
        Self {
            hour,
            minute,
            second,
            day: DayRule::default(),
            tz,
            max_runs: None,
            runs: 0,
            next_at: None,
        }
    }

    /// Creates the trigger with a timezone looked up by IANA name.
    pub fn in_tz(hour: u8, minute: u8, second: u8, zone: &str) -> Result<Self, TriggerError> {
        let tz = Tz::from_str(zone).map_err(|_| TriggerError::UnknownTimezone {
            name: zone.to_string(),
        })?;
        Ok(Self::new(hour, minute, second, tz))
    }

    /// Restricts firing to one weekday per week.
    pub fn on_weekday(mut self, weekday: Weekday) -> Self {
        self.day = DayRule::Weekly(weekday);
        self
    }

    /// Bounds the total number of fires; the trigger is exhausted afterwards.
    pub fn with_max_runs(mut self, max_runs: u64) -> Self {
        self.max_runs = Some(max_runs);
        self
    }

    /// The configured timezone.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Validates the time-of-day fields.
    pub fn validate(&self) -> Result<(), TriggerError> {
        if self.hour > 23 || self.minute > 59 || self.second > 59 {
            return Err(TriggerError::InvalidTimeOfDay {
                hour: self.hour,
                minute: self.minute,
                second: self.second,
            });
        }
        Ok(())
    }

    fn exhausted(&self) -> bool {
        matches!(self.max_runs, Some(max) if self.runs >= max)
    }

    /// Next occurrence strictly after `after`, in UTC.
    fn next_occurrence(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = after.with_timezone(&self.tz);
        let time = NaiveTime::from_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second),
        )?;
        let mut target = local.date_naive().and_time(time);
        let now_naive = local.naive_local();

        match self.day {
            DayRule::Daily => {
                if now_naive >= target {
                    target += TimeDelta::days(1);
                }
            }
            DayRule::Weekly(weekday) => {
                let ahead = i64::from(weekday.num_days_from_monday())
                    - i64::from(local.weekday().num_days_from_monday());
                let mut ahead = ahead.rem_euclid(7);
                if ahead == 0 && now_naive >= target {
                    ahead = 7;
                }
                target += TimeDelta::days(ahead);
            }
        }

        resolve_local(&self.tz, target).map(|dt| dt.with_timezone(&Utc))
    }

    pub(crate) fn next_wait(&mut self, now: DateTime<Utc>) -> Option<Duration> {
        if self.exhausted() {
            return None;
        }
        let next = match self.next_at {
            Some(at) => at,
            None => {
                let at = self.next_occurrence(now)?;
                self.next_at = Some(at);
                at
            }
        };
        Some((next - now).to_std().unwrap_or(Duration::ZERO))
    }

    pub(crate) fn mark_fired(&mut self, now: DateTime<Utc>) {
        self.runs += 1;
        // recompute strictly after the fire instant so the same occurrence
        // is never scheduled twice (At has second granularity)
        self.next_at = self.next_occurrence(now + TimeDelta::seconds(1));
    }
}

/// Maps a naive local datetime into the zone, resolving DST folds to the
/// earlier instant and DST gaps to the earliest valid time after the gap.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest(),
    }
}
