use tickline_core::{ClientConfig, PredictionClient, PredictionRequest, Symbol, UtcDateTime};

use crate::cli::PredictArgs;
use crate::error::CliError;
use crate::output;

pub async fn run(args: &PredictArgs, config: &ClientConfig, pretty: bool) -> Result<(), CliError> {
    let request = PredictionRequest::new(
        Symbol::parse(&args.ticker)?,
        UtcDateTime::parse(&args.start)?.date(),
        UtcDateTime::parse(&args.end)?.date(),
        args.timeframe.into(),
        args.risk_percentage,
    )?;

    let result = PredictionClient::new(config.clone()).submit(&request).await?;
    output::render(&result, pretty)
}
