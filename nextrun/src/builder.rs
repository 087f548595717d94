use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::Timestamp;

use crate::error::ScheduleError;
use crate::part::{PartKind, SyntaxValidatorPart};
use crate::value_set::{FilterMode, ValueSet, WeekdayRule};

/// Simulated years searched for a month with a matching day, both by the
/// feasibility preflight and when stepping over empty months.
pub const SEARCH_YEARS: i16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Constraint {
    Exact(i32),
    Step(i32),
}

impl Constraint {
    fn from_part(part: &SyntaxValidatorPart) -> Result<Self, ScheduleError> {
        if !part.is_valid() {
            return Err(ScheduleError::misuse(format!(
                "{} field '{}' is not valid",
                part.field().as_str(),
                part.raw()
            )));
        }
        let value = i32::from(part.value());
        match part.kind() {
            PartKind::Exact => Ok(Constraint::Exact(value)),
            PartKind::Step => Ok(Constraint::Step(value)),
            PartKind::Unset => Err(ScheduleError::misuse(format!(
                "{} field is unset",
                part.field().as_str()
            ))),
        }
    }
}

/// Day-of-month and day-of-week both filter the single day cursor.
#[derive(Debug, Clone, Copy)]
struct DayRules {
    day_of_month: Constraint,
    day_of_week: Constraint,
    mode: FilterMode,
}

impl DayRules {
    /// Regenerate `days` for `year`-`month` and apply both day constraints.
    fn apply(&self, days: &mut ValueSet, year: i16, month: i8) -> Result<(), ScheduleError> {
        let first = Date::new(year, month, 1).map_err(|e| {
            ScheduleError::calendar(format!("cannot build {year:04}-{month:02}-01: {e}"))
        })?;
        let offset = i32::from(first.weekday().to_sunday_zero_offset()) - 1;

        days.generate(1, i32::from(first.days_in_month()));
        days.clear_filters();
        match self.day_of_month {
            Constraint::Exact(day) => days.add_filter_exact(day),
            Constraint::Step(step) => days.add_filter_step(step, None, None),
        }
        let rule = match self.day_of_week {
            Constraint::Exact(weekday) => WeekdayRule::Exact(weekday),
            Constraint::Step(step) => WeekdayRule::Step(step),
        };
        days.add_filter_weekday(rule, offset);
        days.filter(self.mode);
        Ok(())
    }
}

/// Build the cursor for a field that does not depend on the calendar.
fn unit_set(part: &SyntaxValidatorPart) -> Result<ValueSet, ScheduleError> {
    let (min, max) = part.range();
    let mut set = ValueSet::new(i32::from(min), i32::from(max));
    match Constraint::from_part(part)? {
        Constraint::Exact(value) => set.add_filter_exact(value),
        Constraint::Step(step) => set.add_filter_step(step, None, None),
    }
    set.filter(FilterMode::Sequence);
    Ok(set)
}

fn next_year(year: i16) -> Result<i16, ScheduleError> {
    year.checked_add(1)
        .ok_or_else(|| ScheduleError::calendar("year overflow"))
}

fn prev_year(year: i16) -> Result<i16, ScheduleError> {
    year.checked_sub(1)
        .ok_or_else(|| ScheduleError::calendar("year underflow"))
}

/// Composes the minute, hour, day and month cursors into concrete UTC
/// instants, carrying between units like an odometer.
///
/// The builder is created from five valid parts and a reference instant.
/// Construction runs the feasibility preflight; [`is_valid`](Self::is_valid)
/// is false when no month within [`SEARCH_YEARS`] has a matching day.
/// [`generate_initial_value`](Self::generate_initial_value) then positions
/// the cursors on the latest occurrence at or before the reference, so the
/// first [`next`](Self::next) is the earliest occurrence strictly after it.
#[derive(Debug, Clone)]
pub struct DateBuilder {
    minute: ValueSet,
    hour: ValueSet,
    day: ValueSet,
    month: ValueSet,
    rules: DayRules,
    year: i16,
    reference: DateTime,
    anchor: DateTime,
    valid: bool,
    seeded: bool,
}

impl DateBuilder {
    /// Wire the four cursors for `parts` (minute, hour, day-of-month, month,
    /// day-of-week) and run the feasibility preflight from `reference`.
    ///
    /// Fails only when a part is unset or out of range.
    pub fn new(
        parts: &[SyntaxValidatorPart; 5],
        reference: Timestamp,
    ) -> Result<Self, ScheduleError> {
        let [minute, hour, day_of_month, month, day_of_week] = parts;
        let mode = if day_of_month.is_unrestricted() || day_of_week.is_unrestricted() {
            FilterMode::Sequence
        } else {
            FilterMode::Union
        };
        let rules = DayRules {
            day_of_month: Constraint::from_part(day_of_month)?,
            day_of_week: Constraint::from_part(day_of_week)?,
            mode,
        };
        let reference = reference.to_zoned(TimeZone::UTC).datetime();

        let mut builder = Self {
            minute: unit_set(minute)?,
            hour: unit_set(hour)?,
            day: ValueSet::default(),
            month: unit_set(month)?,
            rules,
            year: reference.year(),
            reference,
            anchor: reference,
            valid: false,
            seeded: false,
        };
        builder.valid = builder.is_feasible();
        if !builder.valid {
            tracing::debug!(
                reference = %reference,
                years = SEARCH_YEARS,
                "no allowed month has a matching day"
            );
        }
        Ok(builder)
    }

    /// False when the schedule can never produce a calendar day, or when
    /// seeding ran off the supported calendar range.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the day-of-month/day-of-week pair is combined as a union.
    pub fn is_day_union(&self) -> bool {
        self.rules.mode == FilterMode::Union
    }

    /// Walk month by month from the reference month through the
    /// [`SEARCH_YEARS`]th following year looking for a non-empty day set.
    fn is_feasible(&mut self) -> bool {
        let start = self.reference.year();
        let (mut year, mut month) = (start, self.reference.month());
        while year - start <= SEARCH_YEARS {
            if self.month.contains(i32::from(month)) {
                match self.rules.apply(&mut self.day, year, month) {
                    Ok(()) if !self.day.is_empty() => return true,
                    Ok(()) => {}
                    Err(_) => return false,
                }
            }
            (year, month) = if month == 12 {
                (year + 1, 1)
            } else {
                (year, month + 1)
            };
        }
        false
    }

    /// Position the cursors relative to the reference instant. Callable once.
    pub fn generate_initial_value(&mut self) -> Result<(), ScheduleError> {
        if self.seeded {
            return Err(ScheduleError::misuse("date builder is already seeded"));
        }
        if !self.valid {
            return Err(ScheduleError::misuse(
                "cannot seed a date builder for a schedule that never fires",
            ));
        }
        self.seeded = true;
        let seeded = self.seed();
        if seeded.is_err() {
            self.valid = false;
        }
        seeded
    }

    fn seed(&mut self) -> Result<(), ScheduleError> {
        let r = self.reference;
        self.year = r.year();
        // Once a coarser unit lands past the reference, finer units restart
        // from their first allowed value.
        let mut moved = false;

        if self.month.search_next(i32::from(r.month()))? {
            self.year = next_year(self.year)?;
            moved = true;
        } else if self.month.current()? != i32::from(r.month()) {
            moved = true;
        }
        self.refill_days()?;
        if self.day.is_empty() {
            self.advance_month()?;
            moved = true;
        }

        if moved {
            self.day.first();
        } else if self.day.search_next(i32::from(r.day()))? {
            self.advance_month()?;
            moved = true;
        } else if self.day.current()? != i32::from(r.day()) {
            moved = true;
        }

        if moved {
            self.hour.first();
        } else if self.hour.search_next(i32::from(r.hour()))? {
            self.carry_day()?;
            moved = true;
        } else if self.hour.current()? != i32::from(r.hour()) {
            moved = true;
        }

        if moved {
            self.minute.first();
        } else if self.minute.search_next(i32::from(r.minute()))? {
            self.carry_hour()?;
        }

        self.sync_anchor()?;
        if self.anchor <= self.reference {
            self.step_forward()?;
        }
        self.step_backward()?;
        self.sync_anchor()
    }

    /// Advance to the next occurrence.
    ///
    /// On error the cursors stay on the current occurrence.
    pub fn next(&mut self) -> Result<Timestamp, ScheduleError> {
        self.ensure_ready()?;
        self.step(Self::step_forward)
    }

    /// Retreat to the previous occurrence.
    ///
    /// On error the cursors stay on the current occurrence.
    pub fn prev(&mut self) -> Result<Timestamp, ScheduleError> {
        self.ensure_ready()?;
        self.step(Self::step_backward)
    }

    fn step(
        &mut self,
        advance: fn(&mut Self) -> Result<(), ScheduleError>,
    ) -> Result<Timestamp, ScheduleError> {
        let saved = self.clone();
        let stepped = advance(self)
            .and_then(|()| self.sync_anchor())
            .and_then(|()| self.timestamp());
        if stepped.is_err() {
            *self = saved;
        }
        stepped
    }

    /// The occurrence the cursors currently sit on.
    pub fn current(&self) -> Result<Timestamp, ScheduleError> {
        self.ensure_ready()?;
        self.timestamp()
    }

    /// Whether `instant` is an occurrence of this schedule.
    pub fn matches(&self, instant: Timestamp) -> Result<bool, ScheduleError> {
        let dt = instant.to_zoned(TimeZone::UTC).datetime();
        if dt.second() != 0 || dt.subsec_nanosecond() != 0 {
            return Ok(false);
        }
        if !self.minute.contains(i32::from(dt.minute()))
            || !self.hour.contains(i32::from(dt.hour()))
            || !self.month.contains(i32::from(dt.month()))
        {
            return Ok(false);
        }
        let mut days = ValueSet::default();
        self.rules.apply(&mut days, dt.year(), dt.month())?;
        Ok(days.contains(i32::from(dt.day())))
    }

    fn ensure_ready(&self) -> Result<(), ScheduleError> {
        if !self.valid {
            return Err(ScheduleError::misuse(
                "date builder is not valid: the schedule never fires",
            ));
        }
        if !self.seeded {
            return Err(ScheduleError::misuse(
                "generate_initial_value must run before stepping the date builder",
            ));
        }
        Ok(())
    }

    fn step_forward(&mut self) -> Result<(), ScheduleError> {
        if self.minute.next()? {
            self.carry_hour()?;
        }
        Ok(())
    }

    fn step_backward(&mut self) -> Result<(), ScheduleError> {
        if self.minute.prev()? && self.hour.prev()? && self.day.prev()? {
            self.retreat_month()?;
        }
        Ok(())
    }

    fn carry_hour(&mut self) -> Result<(), ScheduleError> {
        if self.hour.next()? {
            self.carry_day()?;
        }
        Ok(())
    }

    fn carry_day(&mut self) -> Result<(), ScheduleError> {
        if self.day.next()? {
            self.advance_month()?;
        }
        Ok(())
    }

    /// Move to the next allowed month that has a matching day and put the
    /// day cursor on its first day.
    fn advance_month(&mut self) -> Result<(), ScheduleError> {
        let start = self.year;
        loop {
            if self.month.next()? {
                self.year = next_year(self.year)?;
            }
            self.refill_days()?;
            if !self.day.is_empty() {
                self.day.first();
                return Ok(());
            }
            tracing::trace!(
                year = self.year,
                month = ?self.month.current().ok(),
                "skipping month without a matching day"
            );
            if self.year - start > SEARCH_YEARS {
                return Err(ScheduleError::infeasible(format!(
                    "no matching day within {SEARCH_YEARS} years after {start}"
                )));
            }
        }
    }

    /// Mirror of [`advance_month`](Self::advance_month), landing on the last day.
    fn retreat_month(&mut self) -> Result<(), ScheduleError> {
        let start = self.year;
        loop {
            if self.month.prev()? {
                self.year = prev_year(self.year)?;
            }
            self.refill_days()?;
            if !self.day.is_empty() {
                self.day.last();
                return Ok(());
            }
            tracing::trace!(
                year = self.year,
                month = ?self.month.current().ok(),
                "skipping month without a matching day"
            );
            if start - self.year > SEARCH_YEARS {
                return Err(ScheduleError::infeasible(format!(
                    "no matching day within {SEARCH_YEARS} years before {start}"
                )));
            }
        }
    }

    fn refill_days(&mut self) -> Result<(), ScheduleError> {
        let month = self.month.current()? as i8;
        self.rules.apply(&mut self.day, self.year, month)
    }

    fn sync_anchor(&mut self) -> Result<(), ScheduleError> {
        let month = self.month.current()? as i8;
        let day = self.day.current()? as i8;
        let hour = self.hour.current()? as i8;
        let minute = self.minute.current()? as i8;
        self.anchor = DateTime::new(self.year, month, day, hour, minute, 0, 0).map_err(|e| {
            ScheduleError::calendar(format!(
                "cannot build {:04}-{month:02}-{day:02} {hour:02}:{minute:02}: {e}",
                self.year
            ))
        })?;
        Ok(())
    }

    fn timestamp(&self) -> Result<Timestamp, ScheduleError> {
        self.anchor
            .to_zoned(TimeZone::UTC)
            .map(|zdt| zdt.timestamp())
            .map_err(|e| ScheduleError::calendar(format!("cannot convert {}: {e}", self.anchor)))
    }
}
