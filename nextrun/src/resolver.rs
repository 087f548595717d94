use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};

use crate::cron::CronScheduler;

/// How a schedule string was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScheduleKind {
    /// The literal `now`.
    Now,
    /// A `YYYY-MM-DD HH:MM:SS` UTC timestamp.
    Exact,
    /// Anything else, read as a 5-field cron expression.
    Cron,
}

#[derive(Debug, Clone)]
enum Resolved {
    Once(Option<Timestamp>),
    Cron(Box<CronScheduler>),
}

/// Entry point: turns a schedule string into run times.
///
/// "Cannot resolve" is an answer, not an error: a malformed or infeasible
/// schedule reports `is_repeatable() == false` and yields `None`.
///
/// ```
/// use nextrun::ScheduleResolver;
///
/// let reference = "2026-02-06T12:00:00Z".parse().unwrap();
/// let mut daily = ScheduleResolver::new("30 9 * * *", reference);
/// assert!(daily.is_repeatable());
/// assert_eq!(daily.next().unwrap().to_string(), "2026-02-07T09:30:00Z");
///
/// let mut once = ScheduleResolver::new("2022-01-01 00:00:00", reference);
/// assert!(!once.is_repeatable());
/// assert_eq!(once.next().unwrap().to_string(), "2022-01-01T00:00:00Z");
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleResolver {
    kind: ScheduleKind,
    resolved: Resolved,
    repeatable: bool,
}

impl ScheduleResolver {
    pub fn new(schedule: &str, reference: Timestamp) -> Self {
        let trimmed = schedule.trim();

        let (kind, resolved, repeatable) = if trimmed == "now" {
            (ScheduleKind::Now, Resolved::Once(Some(reference)), false)
        } else if let Some(fields) = exact_fields(trimmed) {
            (ScheduleKind::Exact, Resolved::Once(rollover(fields)), false)
        } else {
            let cron = CronScheduler::new(trimmed, reference);
            let repeatable = cron.is_valid();
            (ScheduleKind::Cron, Resolved::Cron(Box::new(cron)), repeatable)
        };

        tracing::debug!(schedule = trimmed, ?kind, repeatable, "classified schedule");
        Self {
            kind,
            resolved,
            repeatable,
        }
    }

    /// Resolve against the current instant.
    pub fn from_now(schedule: &str) -> Self {
        Self::new(schedule, Timestamp::now())
    }

    pub fn kind(&self) -> ScheduleKind {
        self.kind
    }

    /// True only for a cron expression that parsed and can fire.
    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    /// The next run time. `now` and exact timestamps return their instant on
    /// every call.
    pub fn next(&mut self) -> Option<Timestamp> {
        match &mut self.resolved {
            Resolved::Once(instant) => *instant,
            Resolved::Cron(cron) if self.repeatable => cron.next().ok(),
            Resolved::Cron(_) => None,
        }
    }

    /// The previous run time.
    pub fn prev(&mut self) -> Option<Timestamp> {
        match &mut self.resolved {
            Resolved::Once(instant) => *instant,
            Resolved::Cron(cron) if self.repeatable => cron.prev().ok(),
            Resolved::Cron(_) => None,
        }
    }

    /// Up to `count` upcoming run times. A schedule that does not repeat
    /// yields at most one.
    pub fn next_n(&mut self, count: usize) -> Vec<Timestamp> {
        let limit = if self.repeatable { count } else { count.min(1) };
        let mut out = Vec::with_capacity(limit);
        while out.len() < limit {
            match self.next() {
                Some(instant) => out.push(instant),
                None => break,
            }
        }
        out
    }

    /// The cron scheduler behind a [`ScheduleKind::Cron`] schedule.
    pub fn cron(&self) -> Option<&CronScheduler> {
        match &self.resolved {
            Resolved::Cron(cron) => Some(cron),
            Resolved::Once(_) => None,
        }
    }
}

/// Year, month, day, hour, minute, second of a `YYYY-MM-DD HH:MM:SS` string.
fn exact_fields(s: &str) -> Option<[i64; 6]> {
    const LAYOUT: &[u8; 19] = b"dddd-dd-dd dd:dd:dd";
    let bytes = s.as_bytes();
    if bytes.len() != LAYOUT.len() {
        return None;
    }
    for (b, expected) in bytes.iter().zip(LAYOUT) {
        let ok = match expected {
            b'd' => b.is_ascii_digit(),
            sep => b == sep,
        };
        if !ok {
            return None;
        }
    }
    let number = |range: std::ops::Range<usize>| {
        bytes[range]
            .iter()
            .fold(0i64, |acc, d| acc * 10 + i64::from(d - b'0'))
    };
    Some([
        number(0..4),
        number(5..7),
        number(8..10),
        number(11..13),
        number(14..16),
        number(17..19),
    ])
}

/// Build a UTC instant, carrying out-of-range components into the next
/// larger unit: month 13 is January of the following year, day 42 runs into
/// the next month, hour 24 is the next day.
fn rollover([year, month, day, hour, minute, second]: [i64; 6]) -> Option<Timestamp> {
    let months = month - 1;
    let year = i16::try_from(year + months.div_euclid(12)).ok()?;
    let month = (months.rem_euclid(12) + 1) as i8;
    let first = Date::new(year, month, 1).ok()?;
    let offset = (day - 1) * 86_400 + hour * 3_600 + minute * 60 + second;
    first
        .to_zoned(TimeZone::UTC)
        .ok()?
        .timestamp()
        .checked_add(SignedDuration::from_secs(offset))
        .ok()
}
