//! Behavior-driven tests for the indicator calculator
//!
//! These tests pin the exact SMA/EMA arithmetic the overlay relies on,
//! including partial windows and degenerate inputs.

use tickline_core::indicators::{compute, exponential_moving_average, simple_moving_average};
use tickline_core::{IndicatorKind, IndicatorSelection, ValidationError};

fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (index, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "index {index}: expected {e}, got {a}"
        );
    }
}

// =============================================================================
// Simple moving average
// =============================================================================

#[test]
fn when_sma_is_computed_system_keeps_length_and_first_value() {
    // Given: Several series and periods
    let series = [101.5, 99.0, 103.25, 104.0, 98.5, 97.0, 110.0];

    for period in 1..=10 {
        // When: The SMA is computed
        let output = simple_moving_average(&series, period);

        // Then: Output length matches and the first value is the first input
        assert_eq!(output.len(), series.len(), "period {period}");
        assert_eq!(output[0], series[0], "period {period}");
    }
}

#[test]
fn when_window_is_not_yet_full_system_averages_what_is_available() {
    // Given: A period longer than the early prefix
    let series = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0];

    // When: The SMA is computed with period 3
    let output = simple_moving_average(&series, 3);

    // Then: Early windows are partial, later ones slide
    assert_close(&output, &[10.0, 15.0, 20.0, 30.0, 40.0, 50.0], 1e-12);
}

#[test]
fn when_period_is_one_system_returns_the_input() {
    let series = [3.0, 1.0, 4.0, 1.0, 5.0];
    assert_eq!(simple_moving_average(&series, 1), series.to_vec());
}

// =============================================================================
// Exponential moving average
// =============================================================================

#[test]
fn when_ema_is_computed_system_matches_reference_values() {
    // Given: The reference series and period 5 (k = 1/3)
    let series = [10.0, 12.0, 11.0, 13.0];

    // When: The EMA is computed
    let output = exponential_moving_average(&series, 5);

    // Then: It matches the reference to three decimals
    assert_close(&output, &[10.0, 10.667, 10.778, 11.519], 5e-4);
}

#[test]
fn when_ema_is_computed_system_applies_the_recurrence_exactly() {
    // Given: An arbitrary series
    let series = [250.4, 251.1, 249.75, 252.0, 253.3, 251.9];
    let period = 4;
    let k = 2.0 / (period as f64 + 1.0);

    // When: The EMA is computed
    let output = exponential_moving_average(&series, period);

    // Then: Every value is bit-identical to the documented recurrence
    let mut previous = series[0];
    assert_eq!(output[0], previous);
    for i in 1..series.len() {
        let expected = series[i] * k + previous * (1.0 - k);
        assert_eq!(output[i], expected, "index {i}");
        previous = expected;
    }
}

// =============================================================================
// Selection and degenerate input
// =============================================================================

#[test]
fn when_series_is_empty_or_single_system_does_not_fail() {
    for kind in [
        IndicatorKind::SimpleMovingAverage,
        IndicatorKind::ExponentialMovingAverage,
    ] {
        assert_eq!(compute(&[], kind, 5), Some(Vec::new()));
        assert_eq!(compute(&[7.5], kind, 5), Some(vec![7.5]));
    }
}

#[test]
fn when_none_is_selected_system_clears_the_overlay() {
    let selection = IndicatorSelection::none();
    assert!(selection.is_none());
    assert_eq!(selection.apply(&[1.0, 2.0, 3.0]), None);
}

#[test]
fn when_period_zero_is_requested_system_returns_validation_error() {
    let error = IndicatorSelection::new(IndicatorKind::ExponentialMovingAverage, 0)
        .expect_err("zero period should fail");
    assert_eq!(error, ValidationError::ZeroPeriod);
}
