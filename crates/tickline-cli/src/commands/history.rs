use serde::Serialize;

use tickline_core::{
    load_history, ClientConfig, DateWindow, HistoricalRange, IndicatorKind, PricePoint,
    RestMarketSource, Symbol, UtcDateTime,
};

use crate::cli::HistoryArgs;
use crate::error::CliError;
use crate::output;

use super::overlay_selection;

#[derive(Debug, Serialize)]
struct HistoryResponseData {
    symbol: Symbol,
    range: HistoricalRange,
    window: DateWindow,
    caption: String,
    labels: Vec<String>,
    base_points: Vec<PricePoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlay: Option<OverlayData>,
}

#[derive(Debug, Serialize)]
struct OverlayData {
    kind: IndicatorKind,
    period: usize,
    caption: String,
    values: Vec<f64>,
}

pub async fn run(args: &HistoryArgs, config: &ClientConfig, pretty: bool) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let selection = overlay_selection(&args.overlay, config)?;
    let range = HistoricalRange::from(args.range);
    let window = range.window_ending_at(UtcDateTime::now());
    let source = RestMarketSource::new(config.clone());

    let series = load_history(&source, &symbol, window, &config.label_formatter()).await?;
    let overlay = selection.apply(&series.prices()).map(|values| OverlayData {
        kind: selection.kind(),
        period: selection.period(),
        caption: format!("{symbol} {}", selection.kind().legend()),
        values,
    });

    output::render(
        &HistoryResponseData {
            caption: format!("{symbol} Historical Stock Prices"),
            symbol,
            range,
            window,
            labels: series.labels().to_vec(),
            base_points: series.points().to_vec(),
            overlay,
        },
        pretty,
    )
}
