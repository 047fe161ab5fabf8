use serde::Serialize;

use tickline_core::{ClientConfig, MarketDataSource, RestMarketSource};

use crate::cli::SuggestArgs;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct SuggestResponseData {
    prefix: String,
    suggestions: Vec<String>,
}

pub async fn run(args: &SuggestArgs, config: &ClientConfig, pretty: bool) -> Result<(), CliError> {
    let source = RestMarketSource::new(config.clone());
    let suggestions = source.suggestions(args.prefix.clone()).await?;

    output::render(
        &SuggestResponseData {
            prefix: args.prefix.clone(),
            suggestions,
        },
        pretty,
    )
}
