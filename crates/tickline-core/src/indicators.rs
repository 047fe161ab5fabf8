//! Moving-average overlays computed from a base price series.
//!
//! Every function here is pure and returns a vector of exactly the input
//! length. Early SMA windows are partial rather than padded, and the EMA is
//! seeded with the first observation.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

pub const DEFAULT_PERIOD: usize = 5;

/// Overlay indicator kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    #[default]
    None,
    SimpleMovingAverage,
    ExponentialMovingAverage,
}

impl IndicatorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SimpleMovingAverage => "ma",
            Self::ExponentialMovingAverage => "ema",
        }
    }

    /// Short legend label used in overlay captions.
    pub const fn legend(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::SimpleMovingAverage => "MA",
            Self::ExponentialMovingAverage => "EMA",
        }
    }
}

impl Display for IndicatorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndicatorKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "ma" | "sma" => Ok(Self::SimpleMovingAverage),
            "ema" => Ok(Self::ExponentialMovingAverage),
            other => Err(ValidationError::InvalidIndicator {
                value: other.to_owned(),
            }),
        }
    }
}

/// User-selected overlay: kind plus lookback period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSelection {
    kind: IndicatorKind,
    period: usize,
}

impl Default for IndicatorSelection {
    fn default() -> Self {
        Self::none()
    }
}

impl IndicatorSelection {
    pub fn new(kind: IndicatorKind, period: usize) -> Result<Self, ValidationError> {
        if period == 0 {
            return Err(ValidationError::ZeroPeriod);
        }
        Ok(Self { kind, period })
    }

    pub const fn none() -> Self {
        Self {
            kind: IndicatorKind::None,
            period: DEFAULT_PERIOD,
        }
    }

    pub const fn kind(&self) -> IndicatorKind {
        self.kind
    }

    pub const fn period(&self) -> usize {
        self.period
    }

    pub const fn is_none(&self) -> bool {
        matches!(self.kind, IndicatorKind::None)
    }

    pub fn apply(&self, values: &[f64]) -> Option<Vec<f64>> {
        compute(values, self.kind, self.period)
    }
}

/// Compute an overlay for `kind`; `None` clears the overlay.
pub fn compute(values: &[f64], kind: IndicatorKind, period: usize) -> Option<Vec<f64>> {
    match kind {
        IndicatorKind::None => None,
        IndicatorKind::SimpleMovingAverage => Some(simple_moving_average(values, period)),
        IndicatorKind::ExponentialMovingAverage => {
            Some(exponential_moving_average(values, period))
        }
    }
}

/// Arithmetic mean of `values[max(0, i - period + 1) ..= i]` for each `i`.
///
/// A period of zero is treated as one.
pub fn simple_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(period);
            let window = &values[start..=i];
            window.iter().fold(0.0, |sum, value| sum + value) / window.len() as f64
        })
        .collect()
}

/// `out[0] = v[0]`, `out[i] = v[i] * k + out[i - 1] * (1 - k)` with
/// `k = 2 / (period + 1)`.
pub fn exponential_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut output = Vec::with_capacity(values.len());
    output.push(first);
    for &value in &values[1..] {
        let previous = output[output.len() - 1];
        output.push(value * k + previous * (1.0 - k));
    }
    output
}
