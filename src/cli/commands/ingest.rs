//! Ingest command - maintain dump files from a watch event stream

use crate::cli::args::IngestArgs;
use crate::config::Config;
use crate::error::{KfzfError, KfzfResult};
use crate::ingest::Ingestor;
use crate::store::StoreConfig;
use std::time::Duration;
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Execute the ingest command
pub async fn execute(args: IngestArgs, config: &Config) -> KfzfResult<()> {
    let mut store_config = StoreConfig::from_config(config);
    if let Some(ms) = args.interval_ms {
        store_config.time_between_full_dump = Duration::from_millis(ms);
    }
    store_config.create_dest_dir().await?;

    let resource_types = if args.resources.is_empty() {
        config.store.resources.clone()
    } else {
        args.resources
    };

    let token = CancellationToken::new();
    let mut ingestor = Ingestor::new(token.clone(), &store_config, &resource_types)?;

    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, writing final dumps");
            signal_token.cancel();
        }
    });

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| KfzfError::io(format!("opening {}", path.display()), e))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    // Stores get their final dump even when the stream breaks
    let run_result = ingestor.run(reader).await;
    let stats = ingestor.shutdown().await?;
    run_result?;

    eprintln!(
        "{} applied, {} deleted, {} skipped, {} malformed -> {}",
        stats.applied,
        stats.deleted,
        stats.skipped,
        stats.malformed,
        store_config.dest_dir().display()
    );

    Ok(())
}
