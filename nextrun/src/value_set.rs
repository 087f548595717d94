use std::fmt;
use std::sync::Arc;

use crate::error::ScheduleError;

/// How registered filters are combined by [`ValueSet::filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Keep values accepted by every filter.
    #[default]
    Sequence,
    /// Keep values accepted by at least one filter.
    Union,
}

/// Weekday constraint, evaluated on `(value + offset) mod 7` with 0 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayRule {
    Exact(i32),
    Step(i32),
}

/// A single membership test registered on a [`ValueSet`].
#[derive(Clone)]
pub enum Filter {
    /// `value == n`
    Exact(i32),
    /// Every `step`-th value counted from `min`, within `min..=max`.
    /// Missing bounds default to the bounds of the generated range.
    Step {
        step: i32,
        min: Option<i32>,
        max: Option<i32>,
    },
    /// Day-of-month values whose weekday matches `rule`; `offset` is the
    /// Sunday-based weekday of the 1st of the month minus one.
    Weekday { rule: WeekdayRule, offset: i32 },
    /// Arbitrary predicate.
    Predicate(Arc<dyn Fn(i32) -> bool + Send + Sync>),
}

impl Filter {
    fn accepts(&self, value: i32, bounds: (i32, i32)) -> bool {
        match self {
            Filter::Exact(n) => value == *n,
            Filter::Step { step, min, max } => {
                let lo = min.unwrap_or(bounds.0);
                let hi = max.unwrap_or(bounds.1);
                *step > 0 && value >= lo && value <= hi && (value - lo) % step == 0
            }
            Filter::Weekday { rule, offset } => {
                let weekday = (value + offset).rem_euclid(7);
                match rule {
                    WeekdayRule::Exact(n) => weekday == *n,
                    WeekdayRule::Step(n) => *n > 0 && weekday % n == 0,
                }
            }
            Filter::Predicate(f) => f(value),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Exact(n) => f.debug_tuple("Exact").field(n).finish(),
            Filter::Step { step, min, max } => f
                .debug_struct("Step")
                .field("step", step)
                .field("min", min)
                .field("max", max)
                .finish(),
            Filter::Weekday { rule, offset } => f
                .debug_struct("Weekday")
                .field("rule", rule)
                .field("offset", offset)
                .finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// An ascending run of integers with a cursor.
///
/// Regenerating or filtering the values clears the cursor; it must be seeded
/// again with [`first`](Self::first), [`last`](Self::last) or
/// [`search_next`](Self::search_next) before [`current`](Self::current),
/// [`next`](Self::next) or [`prev`](Self::prev) succeed.
///
/// Moving past either end wraps to the opposite end and reports the wrap to
/// the caller, which decides how to carry into the next unit.
#[derive(Debug, Clone, Default)]
pub struct ValueSet {
    bounds: (i32, i32),
    values: Vec<i32>,
    cursor: Option<usize>,
    filters: Vec<Filter>,
}

impl ValueSet {
    /// A set holding `min..=max` with no filters.
    pub fn new(min: i32, max: i32) -> Self {
        let mut set = Self::default();
        set.generate(min, max);
        set
    }

    /// Replace the values with `min..=max`. Filters are kept but not applied.
    pub fn generate(&mut self, min: i32, max: i32) {
        self.bounds = (min, max);
        self.values = (min..=max).collect();
        self.cursor = None;
    }

    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn add_filter_exact(&mut self, value: i32) {
        self.add_filter(Filter::Exact(value));
    }

    pub fn add_filter_step(&mut self, step: i32, min: Option<i32>, max: Option<i32>) {
        self.add_filter(Filter::Step { step, min, max });
    }

    pub fn add_filter_weekday(&mut self, rule: WeekdayRule, offset: i32) {
        self.add_filter(Filter::Weekday { rule, offset });
    }

    pub fn add_filter_predicate(
        &mut self,
        predicate: impl Fn(i32) -> bool + Send + Sync + 'static,
    ) {
        self.add_filter(Filter::Predicate(Arc::new(predicate)));
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Apply the registered filters to the current values.
    ///
    /// With no filters registered the values are left as they are.
    pub fn filter(&mut self, mode: FilterMode) {
        self.cursor = None;
        if self.filters.is_empty() {
            return;
        }
        let bounds = self.bounds;
        match mode {
            FilterMode::Sequence => {
                for filter in &self.filters {
                    self.values.retain(|v| filter.accepts(*v, bounds));
                }
            }
            FilterMode::Union => {
                let mut kept: Vec<i32> = self
                    .filters
                    .iter()
                    .flat_map(|filter| {
                        self.values
                            .iter()
                            .copied()
                            .filter(move |v| filter.accepts(*v, bounds))
                    })
                    .collect();
                kept.sort_unstable();
                kept.dedup();
                self.values = kept;
            }
        }
    }

    /// Seed the cursor on the smallest value. Leaves it unset when empty.
    pub fn first(&mut self) {
        self.cursor = if self.values.is_empty() { None } else { Some(0) };
    }

    /// Seed the cursor on the largest value. Leaves it unset when empty.
    pub fn last(&mut self) {
        self.cursor = self.values.len().checked_sub(1);
    }

    /// Advance the cursor. Returns `true` when it wrapped to the first value.
    pub fn next(&mut self) -> Result<bool, ScheduleError> {
        let index = self.seeded_cursor()?;
        if index + 1 < self.values.len() {
            self.cursor = Some(index + 1);
            Ok(false)
        } else {
            self.cursor = Some(0);
            Ok(true)
        }
    }

    /// Retreat the cursor. Returns `true` when it wrapped to the last value.
    pub fn prev(&mut self) -> Result<bool, ScheduleError> {
        let index = self.seeded_cursor()?;
        if index > 0 {
            self.cursor = Some(index - 1);
            Ok(false)
        } else {
            self.cursor = Some(self.values.len() - 1);
            Ok(true)
        }
    }

    /// The value under the cursor.
    pub fn current(&self) -> Result<i32, ScheduleError> {
        let index = self.seeded_cursor()?;
        Ok(self.values[index])
    }

    /// Seed the cursor on the first value `>= value`.
    ///
    /// When every value is smaller the cursor wraps to the first value and
    /// `true` is returned, the same signal [`next`](Self::next) gives.
    pub fn search_next(&mut self, value: i32) -> Result<bool, ScheduleError> {
        if self.values.is_empty() {
            return Err(ScheduleError::misuse("cannot search an empty value set"));
        }
        let index = self.values.partition_point(|v| *v < value);
        if index < self.values.len() {
            self.cursor = Some(index);
            Ok(false)
        } else {
            self.cursor = Some(0);
            Ok(true)
        }
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: i32) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    fn seeded_cursor(&self) -> Result<usize, ScheduleError> {
        match self.cursor {
            Some(index) if index < self.values.len() => Ok(index),
            _ => Err(ScheduleError::misuse("value set cursor is not seeded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_walk() {
        let mut set = ValueSet::new(0, 3);
        set.first();
        assert_eq!(set.current().unwrap(), 0);
        assert!(!set.next().unwrap());
        assert!(!set.next().unwrap());
        assert!(!set.next().unwrap());
        assert_eq!(set.current().unwrap(), 3);
        assert!(set.next().unwrap());
        assert_eq!(set.current().unwrap(), 0);
    }

    #[test]
    fn test_prev_wraps_to_last() {
        let mut set = ValueSet::new(1, 12);
        set.first();
        assert!(set.prev().unwrap());
        assert_eq!(set.current().unwrap(), 12);
        assert!(!set.prev().unwrap());
        assert_eq!(set.current().unwrap(), 11);
    }

    #[test]
    fn test_unseeded_cursor_is_misuse() {
        let mut set = ValueSet::new(0, 59);
        assert!(set.current().unwrap_err().is_misuse());
        assert!(set.next().unwrap_err().is_misuse());
        assert!(set.prev().unwrap_err().is_misuse());
    }

    #[test]
    fn test_mutation_clears_cursor() {
        let mut set = ValueSet::new(0, 59);
        set.first();
        set.generate(0, 23);
        assert!(set.current().is_err());
        set.last();
        assert_eq!(set.current().unwrap(), 23);
        set.add_filter_exact(5);
        set.filter(FilterMode::Sequence);
        assert!(set.current().is_err());
    }

    #[test]
    fn test_first_on_empty_leaves_cursor_unset() {
        let mut set = ValueSet::new(1, 30);
        set.add_filter_exact(31);
        set.filter(FilterMode::Sequence);
        assert!(set.is_empty());
        set.first();
        assert!(set.current().is_err());
        set.last();
        assert!(set.current().is_err());
        assert!(set.search_next(1).is_err());
    }

    #[test]
    fn test_step_filter_defaults_to_range_bounds() {
        let mut set = ValueSet::new(0, 59);
        set.add_filter_step(15, None, None);
        set.filter(FilterMode::Sequence);
        assert_eq!(set.values(), &[0, 15, 30, 45]);

        let mut days = ValueSet::new(1, 10);
        days.add_filter_step(3, None, None);
        days.filter(FilterMode::Sequence);
        assert_eq!(days.values(), &[1, 4, 7, 10]);
    }

    #[test]
    fn test_step_filter_explicit_bounds() {
        let mut set = ValueSet::new(0, 23);
        set.add_filter_step(4, Some(2), Some(14));
        set.filter(FilterMode::Sequence);
        assert_eq!(set.values(), &[2, 6, 10, 14]);
    }

    #[test]
    fn test_sequence_mode_intersects() {
        let mut set = ValueSet::new(0, 20);
        set.add_filter_step(2, None, None);
        set.add_filter_step(3, None, None);
        set.filter(FilterMode::Sequence);
        assert_eq!(set.values(), &[0, 6, 12, 18]);
    }

    #[test]
    fn test_union_mode_merges_sorted() {
        let mut set = ValueSet::new(0, 12);
        set.add_filter_step(4, None, None);
        set.add_filter_exact(6);
        set.add_filter_exact(4);
        set.filter(FilterMode::Union);
        assert_eq!(set.values(), &[0, 4, 6, 8, 12]);
    }

    #[test]
    fn test_weekday_filter() {
        // March 2024 starts on a Friday (5), so offset = 4.
        let mut days = ValueSet::new(1, 31);
        days.add_filter_weekday(WeekdayRule::Exact(0), 4);
        days.filter(FilterMode::Sequence);
        assert_eq!(days.values(), &[3, 10, 17, 24, 31]);

        let mut days = ValueSet::new(1, 7);
        days.add_filter_weekday(WeekdayRule::Step(3), 4);
        days.filter(FilterMode::Sequence);
        // Sun 3, Wed 6, Sat 2
        assert_eq!(days.values(), &[2, 3, 6]);
    }

    #[test]
    fn test_weekday_filter_negative_offset() {
        // A month starting on Sunday has offset -1.
        let mut days = ValueSet::new(1, 8);
        days.add_filter_weekday(WeekdayRule::Exact(0), -1);
        days.filter(FilterMode::Sequence);
        assert_eq!(days.values(), &[1, 8]);
    }

    #[test]
    fn test_predicate_filter() {
        let mut set = ValueSet::new(1, 10);
        set.add_filter_predicate(|v| v % 5 == 0);
        set.filter(FilterMode::Sequence);
        assert_eq!(set.values(), &[5, 10]);
    }

    #[test]
    fn test_no_filters_is_noop() {
        let mut set = ValueSet::new(1, 3);
        set.filter(FilterMode::Union);
        assert_eq!(set.values(), &[1, 2, 3]);
    }

    #[test]
    fn test_search_next() {
        let mut set = ValueSet::new(0, 59);
        set.add_filter_step(20, None, None);
        set.filter(FilterMode::Sequence);
        assert!(!set.search_next(20).unwrap());
        assert_eq!(set.current().unwrap(), 20);
        assert!(!set.search_next(21).unwrap());
        assert_eq!(set.current().unwrap(), 40);
        assert!(set.search_next(41).unwrap());
        assert_eq!(set.current().unwrap(), 0);
    }

    #[test]
    fn test_contains() {
        let mut set = ValueSet::new(1, 12);
        set.add_filter_step(3, None, None);
        set.filter(FilterMode::Sequence);
        assert!(set.contains(4));
        assert!(!set.contains(5));
    }
}
