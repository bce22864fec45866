use clap::Parser;

use taxsave::api::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    taxsave::logging::init(cli.verbose);
    taxsave::api::run(cli).await
}
