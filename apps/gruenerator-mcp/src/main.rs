use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = gruenerator_mcp::Args::parse();

	gruenerator_mcp::run(args).await
}
