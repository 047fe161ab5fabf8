use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// One observed price at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: UtcDateTime,
    pub price: f64,
}

impl PricePoint {
    pub fn new(timestamp: UtcDateTime, price: f64) -> Result<Self, ValidationError> {
        if !price.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "price" });
        }
        Ok(Self { timestamp, price })
    }
}

/// Ordered price points with a parallel sequence of display labels.
///
/// Points and labels always have the same length. Timestamps are kept in the
/// order they were pushed; nothing here sorts, deduplicates or checks for
/// monotonic time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    points: Vec<PricePoint>,
    labels: Vec<String>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    pub fn single(point: PricePoint, label: impl Into<String>) -> Self {
        let mut series = Self::with_capacity(1);
        series.push(point, label);
        series
    }

    pub fn push(&mut self, point: PricePoint, label: impl Into<String>) {
        self.points.push(point);
        self.labels.push(label.into());
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
