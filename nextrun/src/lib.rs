//! nextrun: resolve schedule strings into run times.
//!
//! A schedule is one of:
//! - `now`: the reference instant itself;
//! - an exact UTC timestamp `YYYY-MM-DD HH:MM:SS`;
//! - a 5-field cron expression (minute, hour, day-of-month, month,
//!   day-of-week) whose fields are `*`, `*/N` or a number.
//!
//! Cron schedules step forward and backward through their occurrences.
//! Schedules that cannot be resolved are reported as `None`, never as
//! errors.
//!
//! # Examples
//!
//! ```
//! use nextrun::ScheduleResolver;
//!
//! let reference = "2026-02-06T12:00:00Z".parse().unwrap();
//! let mut resolver = ScheduleResolver::new("0 */6 * * *", reference);
//! assert!(resolver.is_repeatable());
//! assert_eq!(resolver.next().unwrap().to_string(), "2026-02-06T18:00:00Z");
//!
//! let mut bogus = ScheduleResolver::new("every tuesday", reference);
//! assert_eq!(bogus.next(), None);
//! ```

pub mod builder;
pub mod cron;
pub mod display;
pub mod error;
pub mod part;
pub mod resolver;
pub mod validator;
pub mod value_set;

pub use builder::{DateBuilder, SEARCH_YEARS};
pub use cron::{CronScheduler, Direction, Occurrences};
pub use error::{ScheduleError, Span};
pub use part::{Field, PartKind, SyntaxValidatorPart};
pub use resolver::{ScheduleKind, ScheduleResolver};
pub use validator::SyntaxValidator;
pub use value_set::{Filter, FilterMode, ValueSet, WeekdayRule};
