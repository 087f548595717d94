use jiff::Timestamp;

use crate::builder::DateBuilder;
use crate::error::ScheduleError;
use crate::validator::SyntaxValidator;

/// Which way an [`Occurrences`] iterator walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// A 5-field cron expression bound to a reference instant.
///
/// Validity is fixed at construction: the expression must parse and some
/// calendar day must be able to match it.
///
/// ```
/// use nextrun::CronScheduler;
///
/// let reference = "2026-02-06T12:00:00Z".parse().unwrap();
/// let mut cron = CronScheduler::new("*/15 * * * *", reference);
/// assert_eq!(cron.next().unwrap().to_string(), "2026-02-06T12:15:00Z");
/// ```
#[derive(Debug, Clone)]
pub struct CronScheduler {
    validator: SyntaxValidator,
    builder: Option<DateBuilder>,
}

impl CronScheduler {
    pub fn new(expression: &str, reference: Timestamp) -> Self {
        let validator = SyntaxValidator::new(expression);
        if !validator.is_valid() {
            return Self {
                validator,
                builder: None,
            };
        }

        let builder = match DateBuilder::new(validator.parts(), reference) {
            Ok(mut builder) => {
                if builder.is_valid() {
                    if let Err(e) = builder.generate_initial_value() {
                        tracing::debug!(
                            expression = validator.input(),
                            error = %e,
                            "cannot seed cron schedule"
                        );
                    }
                }
                Some(builder)
            }
            Err(e) => {
                tracing::debug!(
                    expression = validator.input(),
                    error = %e,
                    "cannot build cron schedule"
                );
                None
            }
        };

        Self { validator, builder }
    }

    /// True when the expression parsed and can fire on some calendar day.
    pub fn is_valid(&self) -> bool {
        self.validator.is_valid() && self.builder.as_ref().is_some_and(DateBuilder::is_valid)
    }

    /// Same as [`is_valid`](Self::is_valid): a well-formed expression that
    /// can never fire is not an acceptable format either.
    pub fn is_format_valid(&self) -> bool {
        self.is_valid()
    }

    pub fn validator(&self) -> &SyntaxValidator {
        &self.validator
    }

    /// The next occurrence.
    pub fn next(&mut self) -> Result<Timestamp, ScheduleError> {
        self.builder_mut()?.next()
    }

    /// The previous occurrence.
    pub fn prev(&mut self) -> Result<Timestamp, ScheduleError> {
        self.builder_mut()?.prev()
    }

    /// The occurrence last returned, or right after construction the latest
    /// occurrence at or before the reference instant.
    pub fn current(&self) -> Result<Timestamp, ScheduleError> {
        match &self.builder {
            Some(builder) => builder.current(),
            None => Err(self.missing_builder()),
        }
    }

    /// Whether `instant` is an occurrence. Always false for an invalid
    /// expression.
    pub fn matches(&self, instant: Timestamp) -> bool {
        match &self.builder {
            Some(builder) if self.is_valid() => builder.matches(instant).unwrap_or(false),
            _ => false,
        }
    }

    /// Lazily step through occurrences in `direction`.
    pub fn occurrences(&mut self, direction: Direction) -> Occurrences<'_> {
        Occurrences {
            scheduler: self,
            direction,
            done: false,
        }
    }

    fn builder_mut(&mut self) -> Result<&mut DateBuilder, ScheduleError> {
        let err = self.missing_builder();
        self.builder.as_mut().ok_or(err)
    }

    fn missing_builder(&self) -> ScheduleError {
        let reason = self
            .validator
            .error()
            .map(ToString::to_string)
            .unwrap_or_else(|| "cron expression is not valid".to_string());
        ScheduleError::misuse(format!(
            "no date builder for '{}': {reason}",
            self.validator.input()
        ))
    }
}

/// Lazy iterator over cron occurrences.
///
/// Each item advances the underlying scheduler, so dropping the iterator
/// leaves the scheduler on the last yielded occurrence. The first error ends
/// the iteration.
pub struct Occurrences<'a> {
    scheduler: &'a mut CronScheduler,
    direction: Direction,
    done: bool,
}

impl Iterator for Occurrences<'_> {
    type Item = Result<Timestamp, ScheduleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || !self.scheduler.is_valid() {
            return None;
        }
        let step = match self.direction {
            Direction::Forward => self.scheduler.next(),
            Direction::Backward => self.scheduler.prev(),
        };
        if step.is_err() {
            self.done = true;
        }
        Some(step)
    }
}
