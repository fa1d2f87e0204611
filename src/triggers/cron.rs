//! # Cron-expression trigger.
//!
//! [`Cron`] fires per a cron schedule evaluated in a named IANA timezone.
//! Standard 5-field expressions (`min hour dom month dow`) are accepted and
//! normalized by prepending a `0` seconds field; 6- and 7-field forms pass
//! through unchanged. Parsing happens at construction, so a malformed
//! expression never reaches the dispatch loop.
//!
//! ## Example
//! ```rust
//! use chime::Cron;
//! use chrono_tz::Tz;
//!
//! // noon every day, Kolkata time
//! let cron = Cron::new("0 12 * * *", Tz::Asia__Kolkata).unwrap();
//! assert_eq!(cron.expression(), "0 0 12 * * *");
//! ```

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;

use crate::error::TriggerError;

/// Fires per a cron schedule in a named timezone.
#[derive(Debug, Clone)]
pub struct Cron {
    schedule: Schedule,
    expr: String,
    tz: Tz,
    max_runs: Option<u64>,
    runs: u64,
    next_at: Option<DateTime<Utc>>,
}

impl Cron {
    /// Parses `expr` and creates the trigger.
    ///
    /// 5-field expressions get a `0` seconds field prepended.
    pub fn new(expr: &str, tz: Tz) -> Result<Self, TriggerError> {
        let normalized = normalize(expr);
        let schedule = Schedule::from_str(&normalized).map_err(|e| TriggerError::InvalidCron {
            expr: expr.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            schedule,
            expr: normalized,
            tz,
            max_runs: None,
            runs: 0,
            next_at: None,
        })
    }

    /// Creates the trigger with a timezone looked up by IANA name.
    pub fn in_tz(expr: &str, zone: &str) -> Result<Self, TriggerError> {
        let tz = Tz::from_str(zone).map_err(|_| TriggerError::UnknownTimezone {
            name: zone.to_string(),
        })?;
        Self::new(expr, tz)
    }

    /// Bounds the total number of fires; the trigger is exhausted afterwards.
    pub fn with_max_runs(mut self, max_runs: u64) -> Self {
        self.max_runs = Some(max_runs);
        self
    }

    /// The normalized (seconds-bearing) expression.
    pub fn expression(&self) -> &str {
        &self.expr
    }

    /// The configured timezone.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    fn exhausted(&self) -> bool {
        matches!(self.max_runs, Some(max) if self.runs >= max)
    }

    /// Next schedule instant strictly after `after`, in UTC.
    fn next_occurrence(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let local = after.with_timezone(&self.tz);
        self.schedule
            .after(&local)
            .next()
            .map(|dt| dt.with_timezone(&Utc))
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
        // `after` is exclusive, so firing exactly on a schedule instant
        // advances to the following one
        self.next_at = self.next_occurrence(now);
    }
}

/// Prepends a seconds field to bare 5-field expressions.
fn normalize(expr: &str) -> String {
    let fields = expr.split_whitespace().count();
    if fields == 5 {
        format!("0 {}", expr.trim())
    } else {
        expr.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn five_field_expressions_are_normalized() {
        let cron = Cron::new("30 12 * * *", Tz::UTC).unwrap();
        assert_eq!(cron.expression(), "0 30 12 * * *");
    }

    #[test]
    fn six_field_expressions_pass_through() {
        let cron = Cron::new("15 30 12 * * *", Tz::UTC).unwrap();
        assert_eq!(cron.expression(), "15 30 12 * * *");
    }

    #[test]
    fn malformed_expression_is_rejected() {
        assert!(matches!(
            Cron::new("not a cron", Tz::UTC),
            Err(TriggerError::InvalidCron { .. })
        ));
    }

    #[test]
    fn waits_until_the_next_schedule_instant() {
        // daily at noon UTC, asked at 09:00 → three hours
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let mut cron = Cron::new("0 12 * * *", Tz::UTC).unwrap();
        assert_eq!(cron.next_wait(now), Some(Duration::from_secs(3 * 3600)));
    }

    #[test]
    fn schedule_is_evaluated_in_the_configured_zone() {
        // noon in Istanbul (UTC+3) is 09:00 UTC
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let mut cron = Cron::new("0 12 * * *", Tz::Europe__Istanbul).unwrap();
        assert_eq!(cron.next_wait(now), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn firing_on_the_instant_advances_to_the_next_one() {
        let noon = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut cron = Cron::new("0 12 * * *", Tz::UTC).unwrap();
        cron.mark_fired(noon);
        assert_eq!(cron.next_wait(noon), Some(Duration::from_secs(86_400)));
    }

    #[test]
    fn max_runs_exhausts_the_trigger() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let mut cron = Cron::new("0 12 * * *", Tz::UTC).unwrap().with_max_runs(1);
        assert!(cron.next_wait(now).is_some());
        cron.mark_fired(now);
        assert_eq!(cron.next_wait(now), None);
    }
}
