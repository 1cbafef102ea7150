//! Coil entity and its validated constructors.
//!
//! A coil is identified by a store-assigned integer id and carries strictly
//! positive length and weight measurements. It is active until `removed_at`
//! is set; removal happens at most once and never precedes `added_at`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned coil identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoilId(i64);

impl CoilId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CoilId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for coil measurements and lifecycle timestamps.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoilValidationError {
    /// Length was zero, negative, or not a finite number.
    #[error("length must be a positive number, got {value}")]
    NonPositiveLength { value: f64 },
    /// Weight was zero, negative, or not a finite number.
    #[error("weight must be a positive number, got {value}")]
    NonPositiveWeight { value: f64 },
    /// Removal timestamp precedes the addition timestamp.
    #[error("removed_at ({removed_at}) must not precede added_at ({added_at})")]
    RemovedBeforeAdded {
        added_at: DateTime<Utc>,
        removed_at: DateTime<Utc>,
    },
}

impl CoilValidationError {
    /// Name of the offending field, for adapter error context.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveLength { .. } => "length",
            Self::NonPositiveWeight { .. } => "weight",
            Self::RemovedBeforeAdded { .. } => "removed_at",
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Validated measurements for a coil that has not been persisted yet.
///
/// # Examples
/// ```
/// use coil_inventory::domain::NewCoil;
///
/// let coil = NewCoil::new(10.0, 20.0).expect("valid measurements");
/// assert_eq!(coil.length(), 10.0);
/// assert!(NewCoil::new(0.0, 20.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewCoil {
    length: f64,
    weight: f64,
}

impl NewCoil {
    /// Validate measurements for a new coil.
    pub fn new(length: f64, weight: f64) -> Result<Self, CoilValidationError> {
        if !is_positive(length) {
            return Err(CoilValidationError::NonPositiveLength { value: length });
        }
        if !is_positive(weight) {
            return Err(CoilValidationError::NonPositiveWeight { value: weight });
        }
        Ok(Self { length, weight })
    }

    /// Coil length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Coil weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Input for [`Coil::new`], typically decoded from a persisted row.
#[derive(Debug, Clone, PartialEq)]
pub struct CoilDraft {
    pub id: CoilId,
    pub length: f64,
    pub weight: f64,
    pub added_at: DateTime<Utc>,
    pub removed_at: Option<DateTime<Utc>>,
}

/// A persisted coil.
#[derive(Debug, Clone, PartialEq)]
pub struct Coil {
    id: CoilId,
    measurements: NewCoil,
    added_at: DateTime<Utc>,
    removed_at: Option<DateTime<Utc>>,
}

impl Coil {
    /// Validate a draft into a coil.
    pub fn new(draft: CoilDraft) -> Result<Self, CoilValidationError> {
        let CoilDraft {
            id,
            length,
            weight,
            added_at,
            removed_at,
        } = draft;

        let measurements = NewCoil::new(length, weight)?;
        if let Some(removed_at) = removed_at.filter(|removed_at| *removed_at < added_at) {
            return Err(CoilValidationError::RemovedBeforeAdded {
                added_at,
                removed_at,
            });
        }

        Ok(Self {
            id,
            measurements,
            added_at,
            removed_at,
        })
    }

    /// Store-assigned identifier.
    #[must_use]
    pub fn id(&self) -> CoilId {
        self.id
    }

    /// Coil length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.measurements.length()
    }

    /// Coil weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.measurements.weight()
    }

    /// When the coil entered stock.
    #[must_use]
    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// When the coil left stock, if it has.
    #[must_use]
    pub fn removed_at(&self) -> Option<DateTime<Utc>> {
        self.removed_at
    }

    /// Whether the coil is still in stock.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.removed_at.is_none()
    }

    /// Earliest valid removal time given a clock reading.
    ///
    /// Clamps to `added_at` so a clock that moved backwards cannot produce a
    /// removal that precedes the addition.
    #[must_use]
    pub fn removal_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(self.added_at)
    }
}
