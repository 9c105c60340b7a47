use portcullis::app::{config_path, AppBuilder};
use portcullis::prelude::*;
use portcullis_core::Config;

#[tokio::main]
async fn main() -> PcResult<()> {
	let mut builder = AppBuilder::new();

	let path = config_path(std::env::args().nth(1));
	let config = Config::load(&path).inspect_err(|e| {
		error!("FATAL: Cannot load configuration {}: {}", path.display(), e);
	})?;

	builder.configure(config)?;
	builder.run().await
}

// vim: ts=4
