//! Cron expression parsing and evaluation.

use crate::error::{SchedulerError, SchedulerResult};
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

/// A parsed cron schedule.
///
/// Accepts the standard five-field form (minute, hour, day-of-month,
/// month, day-of-week); a seconds field of `0` is prefixed before parsing.
/// Six- and seven-field expressions pass through unchanged.
#[derive(Debug, Clone)]
pub struct CronExpression {
    schedule: Schedule,
    expression: String,
}

impl CronExpression {
    /// Parse a cron expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use kudi_scheduler::CronExpression;
    ///
    /// // Every day at 02:00.
    /// let expr = CronExpression::parse("0 2 * * *").unwrap();
    /// assert!(expr.next().is_some());
    ///
    /// // First of the month at 01:00.
    /// CronExpression::parse("0 1 1 * *").unwrap();
    ///
    /// // Sundays at midnight.
    /// CronExpression::parse("0 0 * * 0").unwrap();
    /// ```
    pub fn parse(expression: &str) -> SchedulerResult<Self> {
        let expression = expression.trim();
        let fields: Vec<&str> = expression.split_whitespace().collect();

        let normalized = match fields.len() {
            5 => {
                // Prefix a zero seconds field and shift the day-of-week
                // numbering: Unix cron counts Sunday as 0, the parser as 1.
                let dow = normalize_day_of_week(fields[4]);
                format!(
                    "0 {} {} {} {} {}",
                    fields[0], fields[1], fields[2], fields[3], dow
                )
            }
            6 | 7 => expression.to_string(),
            n => {
                return Err(SchedulerError::InvalidExpression(format!(
                    "{expression}: expected 5 fields, got {n}"
                )))
            }
        };

        let schedule = Schedule::from_str(&normalized)
            .map_err(|e| SchedulerError::InvalidExpression(format!("{expression}: {e}")))?;

        Ok(Self {
            schedule,
            expression: expression.to_string(),
        })
    }

    /// Next fire time strictly after the given instant.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    /// Next fire time from now.
    pub fn next(&self) -> Option<DateTime<Utc>> {
        self.next_after(Utc::now())
    }

    /// The original expression text.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// Shift numeric day-of-week values from Unix numbering (0 or 7 = Sunday)
/// to the parser's 1-7 numbering. Step divisors after `/` and day names
/// pass through untouched.
fn normalize_day_of_week(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars().peekable();
    let mut after_slash = false;

    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            let mut number = (c as u32) - ('0' as u32);
            while let Some(digit) = chars.peek().and_then(|next| next.to_digit(10)) {
                number = number * 10 + digit;
                chars.next();
            }
            if after_slash {
                out.push_str(&number.to_string());
            } else {
                out.push_str(&((number % 7) + 1).to_string());
            }
        } else {
            after_slash = c == '/';
            out.push(c);
        }
    }
    out
}
