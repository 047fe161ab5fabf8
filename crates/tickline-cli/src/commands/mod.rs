mod history;
mod predict;
mod quote;
mod suggest;
mod watch;

use tickline_core::{parse_utc_offset, ClientConfig, IndicatorSelection};

use crate::cli::{Cli, Command, OverlayArgs};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = resolve_config(cli)?;

    match &cli.command {
        Command::Watch(args) => watch::run(args, &config).await,
        Command::Quote(args) => quote::run(args, &config, cli.pretty).await,
        Command::History(args) => history::run(args, &config, cli.pretty).await,
        Command::Suggest(args) => suggest::run(args, &config, cli.pretty).await,
        Command::Predict(args) => predict::run(args, &config, cli.pretty).await,
    }
}

/// Environment configuration with global flags layered on top.
fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;

    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(url) = &cli.stream_url {
        config.stream_url = url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout_ms = (timeout_ms > 0).then_some(timeout_ms);
    }
    if let Some(offset) = &cli.label_offset {
        config.label_offset = parse_utc_offset(offset)?;
    }

    Ok(config)
}

fn overlay_selection(
    args: &OverlayArgs,
    config: &ClientConfig,
) -> Result<IndicatorSelection, CliError> {
    let period = args.period.unwrap_or(config.indicator_period);
    Ok(IndicatorSelection::new(args.indicator.into(), period)?)
}
