use std::sync::Arc;

use tracing::{debug, info, warn};

use tickline_core::{
    ClientConfig, EngineState, HistoricalRange, MarketSession, RestMarketSource, Symbol,
    WebSocketTickFeed,
};

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output;

use super::overlay_selection;

pub async fn run(args: &WatchArgs, config: &ClientConfig) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let selection = overlay_selection(&args.overlay, config)?;

    let (handle, task) = MarketSession::spawn(
        Arc::new(RestMarketSource::new(config.clone())),
        Arc::new(WebSocketTickFeed::from_config(config)),
        config.label_formatter(),
    );
    handle.select_range(HistoricalRange::from(args.range))?;
    handle.select_symbol(symbol)?;

    let mut views = handle.views();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut seeded = false;
    let mut published = 0usize;
    let outcome = loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let view = views.borrow_and_update().clone();
                output::render_line(&view)?;
                published += 1;

                if !seeded {
                    match view.state {
                        EngineState::Live => {
                            seeded = true;
                            // seeding resets the overlay, so apply it afterwards
                            if !selection.is_none() {
                                handle.select_indicator(selection)?;
                            }
                            if args.history {
                                handle.load_history()?;
                            }
                        }
                        EngineState::Idle => {
                            if let Some(notice) = view.notice {
                                break Err(CliError::Seed {
                                    code: notice.code,
                                    message: notice.message,
                                });
                            }
                        }
                        EngineState::Seeding | EngineState::Replacing => {}
                    }
                }

                if args.updates.is_some_and(|limit| published >= limit) {
                    break Ok(());
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break Ok(());
            }
        }
    };

    if let Err(error) = handle.shutdown() {
        debug!(error = %error, "session already stopped");
    }
    if let Err(error) = task.await {
        warn!(error = %error, "session task ended abnormally");
    }
    outcome
}
