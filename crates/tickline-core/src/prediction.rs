//! Price prediction request and client (`POST /predict`).

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::debug;

use crate::domain::format_iso_date;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{ClientConfig, CoreError, LoadError, Symbol, ValidationError};

/// Prediction horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    ShortTerm,
    LongTerm,
}

impl Timeframe {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShortTerm => "short-term",
            Self::LongTerm => "long-term",
        }
    }
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "short-term" | "short" => Ok(Self::ShortTerm),
            "long-term" | "long" => Ok(Self::LongTerm),
            other => Err(ValidationError::InvalidTimeframe {
                value: other.to_owned(),
            }),
        }
    }
}

/// Validated prediction request.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    ticker: Symbol,
    start: Date,
    end: Date,
    timeframe: Timeframe,
    risk_percentage: Option<f64>,
}

#[derive(Debug, Serialize)]
struct PredictionBody<'a> {
    ticker: &'a str,
    start: String,
    end: String,
    timeframe: Timeframe,
    #[serde(skip_serializing_if = "Option::is_none")]
    risk_percentage: Option<f64>,
}

impl PredictionRequest {
    pub fn new(
        ticker: Symbol,
        start: Date,
        end: Date,
        timeframe: Timeframe,
        risk_percentage: Option<f64>,
    ) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedDateWindow {
                start: format_iso_date(start),
                end: format_iso_date(end),
            });
        }
        if let Some(risk) = risk_percentage {
            if !risk.is_finite() {
                return Err(ValidationError::NonFiniteValue {
                    field: "risk_percentage",
                });
            }
            if risk < 0.0 {
                return Err(ValidationError::NegativeValue {
                    field: "risk_percentage",
                });
            }
        }

        Ok(Self {
            ticker,
            start,
            end,
            timeframe,
            risk_percentage,
        })
    }

    pub fn ticker(&self) -> &Symbol {
        &self.ticker
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// JSON body with ISO dates.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&PredictionBody {
            ticker: self.ticker.as_str(),
            start: format_iso_date(self.start),
            end: format_iso_date(self.end),
            timeframe: self.timeframe,
            risk_percentage: self.risk_percentage,
        })
    }
}

/// Model output returned verbatim by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_closing_price: f64,
    pub threshold_price: f64,
    pub mean_absolute_error: f64,
    pub mean_absolute_percentage_error: f64,
    pub mean_squared_error: f64,
}

#[derive(Clone)]
pub struct PredictionClient {
    http_client: Arc<dyn HttpClient>,
    config: ClientConfig,
}

impl PredictionClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(config: ClientConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub async fn submit(&self, request: &PredictionRequest) -> Result<PredictionResult, CoreError> {
        let url = self.config.api_url("predict");
        let body = request.to_json()?;
        debug!(%url, ticker = %request.ticker, "submitting prediction");

        let http_request = HttpRequest::post_json(&url, body)
            .with_timeout_ms(self.config.request_timeout_ms);
        let response = self.http_client.execute(http_request).await.map_err(|e| {
            LoadError::network(format!("prediction request failed: {}", e.message()))
        })?;

        if !response.is_success() {
            return Err(LoadError::network(format!(
                "prediction backend returned status {}",
                response.status
            ))
            .into());
        }

        serde_json::from_str(&response.body).map_err(|e| {
            LoadError::data_unavailable(format!("failed to decode prediction: {e}")).into()
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn ticker() -> Symbol {
        Symbol::parse("HDFCBANK.NS").expect("symbol")
    }

    #[test]
    fn serializes_wire_body() {
        let request = PredictionRequest::new(
            ticker(),
            date!(2024 - 01 - 01),
            date!(2024 - 03 - 31),
            Timeframe::ShortTerm,
            Some(2.5),
        )
        .expect("request");

        let body: serde_json::Value =
            serde_json::from_str(&request.to_json().expect("json")).expect("value");
        assert_eq!(
            body,
            serde_json::json!({
                "ticker": "HDFCBANK.NS",
                "start": "2024-01-01",
                "end": "2024-03-31",
                "timeframe": "short-term",
                "risk_percentage": 2.5
            })
        );
    }

    #[test]
    fn rejects_inverted_window_and_negative_risk() {
        let inverted = PredictionRequest::new(
            ticker(),
            date!(2024 - 03 - 31),
            date!(2024 - 01 - 01),
            Timeframe::LongTerm,
            None,
        );
        assert!(matches!(
            inverted,
            Err(ValidationError::InvertedDateWindow { .. })
        ));

        let negative = PredictionRequest::new(
            ticker(),
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 01),
            Timeframe::LongTerm,
            Some(-1.0),
        );
        assert!(matches!(
            negative,
            Err(ValidationError::NegativeValue { .. })
        ));
    }

    #[test]
    fn parses_timeframe() {
        assert_eq!(
            Timeframe::from_str("Long-Term").expect("timeframe"),
            Timeframe::LongTerm
        );
        assert!(Timeframe::from_str("intraday").is_err());
    }
}
