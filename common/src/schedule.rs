// Cron schedule parsing and next occurrence calculation
//
// The pipeline runs one cron-driven task, the daily profile nudge. The
// expression uses second precision and is evaluated in a configured
// timezone, then converted back to UTC for sleeping.

use crate::errors::ScheduleError;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use std::str::FromStr;

/// Parse and validate a cron expression with second precision
pub fn parse_cron_expression(expression: &str) -> Result<CronSchedule, ScheduleError> {
    CronSchedule::from_str(expression).map_err(|e| ScheduleError::InvalidCronExpression {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    Tz::from_str(name).map_err(|_| ScheduleError::InvalidTimezone(name.to_string()))
}

/// Default timezone for schedule evaluation
pub fn default_timezone() -> Tz {
    chrono_tz::Asia::Ho_Chi_Minh
}

/// A parsed cron schedule bound to a timezone.
///
/// Parsing happens once at startup; a bad expression or timezone is a
/// configuration error, not something to discover mid-loop.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    expression: String,
    schedule: CronSchedule,
    timezone: Tz,
}

impl DailySchedule {
    pub fn new(expression: &str, timezone_name: &str) -> Result<Self, ScheduleError> {
        let schedule = parse_cron_expression(expression)?;
        let timezone = parse_timezone(timezone_name)?;
        Ok(Self {
            expression: expression.to_string(),
            schedule,
            timezone,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Next occurrence strictly after `after`, evaluated in the bound
    /// timezone and returned in UTC.
    pub fn next_after(&self, after: DateTime<Utc>) -> Result<DateTime<Utc>, ScheduleError> {
        let after_in_tz = after.with_timezone(&self.timezone);
        let next_in_tz = self
            .schedule
            .after(&after_in_tz)
            .next()
            .ok_or_else(|| ScheduleError::NoNextOccurrence(self.expression.clone()))?;
        Ok(next_in_tz.with_timezone(&Utc))
    }
}
