use serde::Serialize;

use tickline_core::{load_snapshot, ClientConfig, QuoteView, RestMarketSource, Symbol};

use crate::cli::QuoteArgs;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct QuoteResponseData {
    symbol: Symbol,
    label: String,
    quote: QuoteView,
}

pub async fn run(args: &QuoteArgs, config: &ClientConfig, pretty: bool) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let source = RestMarketSource::new(config.clone());

    let seed = load_snapshot(&source, &symbol, &config.label_formatter()).await?;
    let label = seed.series.labels().first().cloned().unwrap_or_default();

    output::render(
        &QuoteResponseData {
            symbol,
            label,
            quote: QuoteView::from(&seed.quote),
        },
        pretty,
    )
}
