pub mod server;

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use gruenerator_service::{Caches, GrueneratorService};
use gruenerator_storage::qdrant::QdrantStore;

#[derive(Debug, Parser)]
#[command(
	version = gruenerator_cli::VERSION,
	rename_all = "kebab",
	styles = gruenerator_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> Result<()> {
	let config = gruenerator_config::load(&args.config)?;

	init_tracing(&config);

	let caches = Arc::new(Caches::from_config(&config.cache)?);
	let store = QdrantStore::new(&config.storage.qdrant, &config.search)?;

	tracing::info!(
		collections = ?config.collection_ids(),
		embedding_model = %config.providers.embedding.model,
		"Search service configured."
	);

	let service = Arc::new(GrueneratorService::new(config, Arc::new(store), caches));

	server::serve_mcp(service).await
}

fn init_tracing(config: &gruenerator_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}
