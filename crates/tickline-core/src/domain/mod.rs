//! # Domain Models
//!
//! Shared vocabulary of the series engine.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Opaque, case-sensitive instrument identifier |
//! | [`UtcDateTime`] | UTC instant accepting RFC3339, ISO dates and epoch millis |
//! | [`PricePoint`] | One finite price at one instant |
//! | [`Series`] | Ordered points with parallel display labels |
//! | [`Quote`] | Descriptive snapshot fields (open, high, low, market cap) |
//! | [`HistoricalRange`] | 1d / 1w / 1m / 1y window selector |
//! | [`DateWindow`] | Calendar window derived from a range and "now" |
//! | [`LabelFormatter`] | Cadence-aware axis label rendering |
//!
//! Constructors validate their invariants and return [`ValidationError`]
//! (re-exported at the crate root) on violation.

mod labels;
mod quote;
mod range;
mod series;
mod symbol;
mod timestamp;

pub use labels::{parse_utc_offset, Cadence, LabelFormatter};
pub use quote::{format_market_cap, Quote};
pub(crate) use range::format_iso_date;
pub use range::{DateWindow, HistoricalRange};
pub use series::{PricePoint, Series};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
