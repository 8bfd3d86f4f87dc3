//! Command handlers: the poll loop and one-shot JSON dumps.

use std::future::Future;
use std::io;

use serde::Serialize;
use tracing::{debug, info, warn};

use unipoll_config::Config;
use unipoll_core::{CoreError, InventorySource, Poller, SiteFilter, UnifiSource, connect_influx};

use crate::cli::DumpTarget;
use crate::error::CliError;

/// Connect to both ends and poll until the error threshold or Ctrl-C.
pub async fn run(config: &Config) -> Result<(), CliError> {
    let poller_config = config.poller_config()?;
    let influx_config = config.influx_config()?;
    let controller_config = config.controller_config()?;

    let sink = connect_influx(&influx_config)?;
    info!(
        url = %influx_config.url,
        database = %poller_config.batch.database,
        "writing to InfluxDB"
    );

    let source = UnifiSource::connect(&controller_config).await?;
    let mut poller = Poller::new(poller_config, source, sink);

    let result: Result<(), CoreError> = async {
        poller.check_sites().await?;
        until_interrupted(poller.run(), tokio::signal::ctrl_c()).await
    }
    .await;

    poller.source().disconnect().await;
    result.map_err(CliError::from)
}

/// Drive `poll` until it finishes or `shutdown` fires.
///
/// If the shutdown listener itself fails, polling carries on without it.
async fn until_interrupted<P, S>(poll: P, shutdown: S) -> Result<(), CoreError>
where
    P: Future<Output = Result<(), CoreError>>,
    S: Future<Output = io::Result<()>>,
{
    tokio::pin!(poll);
    tokio::select! {
        result = &mut poll => result,
        signal = shutdown => match signal {
            Ok(()) => {
                info!("interrupted, shutting down");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for Ctrl-C, polling without it");
                poll.await
            }
        },
    }
}

/// Fetch the configured sites' data once and print it as pretty JSON.
pub async fn dump(config: &Config, target: DumpTarget) -> Result<(), CliError> {
    let poller_config = config.poller_config()?;
    let controller_config = config.controller_config()?;

    let source = UnifiSource::connect(&controller_config).await?;
    let result = fetch_json(&source, &SiteFilter::new(poller_config.sites), target).await;
    source.disconnect().await;

    println!("{}", result?);
    Ok(())
}

async fn fetch_json(
    source: &UnifiSource,
    filter: &SiteFilter,
    target: DumpTarget,
) -> Result<String, CliError> {
    let sites = filter.filtered_sites(source).await?;
    debug!(sites = sites.len(), ?target, "dumping");

    match target {
        DumpTarget::Sites => pretty(&sites),
        DumpTarget::Clients => pretty(&source.fetch_clients(&sites).await?),
        DumpTarget::Devices => pretty(&source.fetch_devices(&sites).await?),
    }
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use std::future::pending;

    use super::*;

    #[tokio::test]
    async fn interrupt_stops_polling_cleanly() {
        let poll = pending::<Result<(), CoreError>>();
        let shutdown = async { Ok::<(), io::Error>(()) };

        let result = until_interrupted(poll, shutdown).await;


        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_polling() {
        let poll = async {
            tokio::task::yield_now().await;
            Err::<(), _>(CoreError::MaxErrorsReached { count: 1, max: 0 })
        };
        let shutdown = async { Err::<(), _>(io::Error::other("no signal handler")) };

        let result = until_interrupted(poll, shutdown).await;

        assert!(
            matches!(result, Err(CoreError::MaxErrorsReached { count: 1, max: 0 })),
            "expected the poll result, got: {result:?}"
        );
    }
}
