//! Declarative range filters over coil fields.
//!
//! A [`CoilFilter`] holds one optional inclusive [`ValueRange`] per filterable
//! field. Field constraints combine with logical AND; a filter with no bounds
//! matches every coil. Persistence adapters translate each range uniformly,
//! and [`CoilFilter::matches`] gives the same semantics in memory.

use chrono::{DateTime, Utc};

use super::{Coil, CoilId};

/// Optional inclusive lower and upper bounds on a single value.
///
/// # Examples
/// ```
/// use coil_inventory::domain::ValueRange;
///
/// let range = ValueRange::between(2, 4);
/// assert!(range.contains(&3));
/// assert!(!range.contains(&5));
/// assert!(ValueRange::<i32>::unbounded().contains(&i32::MAX));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T> Default for ValueRange<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> ValueRange<T> {
    /// Build a range from optional bounds.
    #[must_use]
    pub const fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    /// A range that imposes no constraint.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self::new(None, None)
    }

    /// Inclusive range with both bounds present.
    #[must_use]
    pub const fn between(min: T, max: T) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// Values greater than or equal to `min`.
    #[must_use]
    pub const fn at_least(min: T) -> Self {
        Self::new(Some(min), None)
    }

    /// Values less than or equal to `max`.
    #[must_use]
    pub const fn at_most(max: T) -> Self {
        Self::new(None, Some(max))
    }

    /// Lower bound, if any.
    pub fn min(&self) -> Option<&T> {
        self.min.as_ref()
    }

    /// Upper bound, if any.
    pub fn max(&self) -> Option<&T> {
        self.max.as_ref()
    }

    /// Whether neither bound is present.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Split the range into its lower and upper bounds.
    pub fn into_bounds(self) -> (Option<T>, Option<T>) {
        (self.min, self.max)
    }

    /// Convert both bounds with `f`, keeping absent bounds absent.
    #[must_use]
    pub fn map<U>(self, f: impl Fn(T) -> U) -> ValueRange<U> {
        ValueRange::new(self.min.map(&f), self.max.map(&f))
    }
}

impl<T: PartialOrd> ValueRange<T> {
    /// Whether `value` satisfies every present bound.
    pub fn contains(&self, value: &T) -> bool {
        self.min.as_ref().is_none_or(|min| value >= min)
            && self.max.as_ref().is_none_or(|max| value <= max)
    }

    /// Whether an optional value satisfies the range.
    ///
    /// Absent values only satisfy an unbounded range.
    pub fn contains_optional(&self, value: Option<&T>) -> bool {
        match value {
            Some(value) => self.contains(value),
            None => self.is_unbounded(),
        }
    }
}

/// Conjunctive range filter over the coil's filterable fields.
///
/// # Examples
/// ```
/// use coil_inventory::domain::{CoilFilter, ValueRange};
///
/// let filter = CoilFilter::default().with_weight(ValueRange::between(40.0, 80.0));
/// assert!(!filter.is_unconstrained());
/// assert!(CoilFilter::default().is_unconstrained());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoilFilter {
    pub id: ValueRange<CoilId>,
    pub weight: ValueRange<f64>,
    pub length: ValueRange<f64>,
    pub added_at: ValueRange<DateTime<Utc>>,
    pub removed_at: ValueRange<DateTime<Utc>>,
}

impl CoilFilter {
    /// Restrict the identifier range.
    #[must_use]
    pub fn with_id(mut self, range: ValueRange<CoilId>) -> Self {
        self.id = range;
        self
    }

    /// Restrict the weight range.
    #[must_use]
    pub fn with_weight(mut self, range: ValueRange<f64>) -> Self {
        self.weight = range;
        self
    }

    /// Restrict the length range.
    #[must_use]
    pub fn with_length(mut self, range: ValueRange<f64>) -> Self {
        self.length = range;
        self
    }

    /// Restrict the addition timestamp range.
    #[must_use]
    pub fn with_added_at(mut self, range: ValueRange<DateTime<Utc>>) -> Self {
        self.added_at = range;
        self
    }

    /// Restrict the removal timestamp range.
    #[must_use]
    pub fn with_removed_at(mut self, range: ValueRange<DateTime<Utc>>) -> Self {
        self.removed_at = range;
        self
    }

    /// Whether the filter matches every coil.
    pub fn is_unconstrained(&self) -> bool {
        self.id.is_unbounded()
            && self.weight.is_unbounded()
            && self.length.is_unbounded()
            && self.added_at.is_unbounded()
            && self.removed_at.is_unbounded()
    }

    /// Evaluate the filter against a coil in memory.
    pub fn matches(&self, coil: &Coil) -> bool {
        self.id.contains(&coil.id())
            && self.weight.contains(&coil.weight())
            && self.length.contains(&coil.length())
            && self.added_at.contains(&coil.added_at())
            && self.removed_at.contains_optional(coil.removed_at().as_ref())
    }
}
