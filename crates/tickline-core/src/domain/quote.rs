use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Descriptive fields of the most recent snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub open: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_time: UtcDateTime,
}

impl Quote {
    pub fn new(
        symbol: Symbol,
        price: f64,
        open: Option<f64>,
        day_high: Option<f64>,
        day_low: Option<f64>,
        market_cap: Option<f64>,
        market_time: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;
        validate_optional_non_negative("open", open)?;
        validate_optional_non_negative("day_high", day_high)?;
        validate_optional_non_negative("day_low", day_low)?;
        validate_optional_non_negative("market_cap", market_cap)?;

        Ok(Self {
            symbol,
            price,
            open,
            day_high,
            day_low,
            market_cap,
            market_time,
        })
    }

    pub fn market_cap_display(&self) -> Option<String> {
        self.market_cap.map(format_market_cap)
    }
}

/// Human-readable market capitalization in rupee tiers.
pub fn format_market_cap(market_cap: f64) -> String {
    if market_cap >= 1e12 {
        format!("{:.2} Trillion ₹", market_cap / 1e12)
    } else if market_cap >= 1e9 {
        format!("{:.2} Billion ₹", market_cap / 1e9)
    } else if market_cap >= 1e7 {
        format!("{:.2} Crore ₹", market_cap / 1e7)
    } else {
        format!("{market_cap} ₹")
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_market_cap_tiers() {
        assert_eq!(format_market_cap(2_345_000_000_000.0), "2.35 Trillion ₹");
        assert_eq!(format_market_cap(12_500_000_000.0), "12.50 Billion ₹");
        assert_eq!(format_market_cap(45_000_000.0), "4.50 Crore ₹");
        assert_eq!(format_market_cap(9_000.0), "9000 ₹");
    }

    #[test]
    fn rejects_negative_fields() {
        let symbol = Symbol::parse("INFY").expect("symbol");
        let err = Quote::new(
            symbol,
            1500.0,
            Some(-1.0),
            None,
            None,
            None,
            UtcDateTime::now(),
        )
        .expect_err("must fail");
        assert_eq!(err, ValidationError::NegativeValue { field: "open" });
    }
}
