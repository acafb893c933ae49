use clap::Parser;
use core_config::load_dotenv;
use core_config::tracing::install_color_eyre;
use eyre::Result;
use recipe_embedder::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    load_dotenv();

    let cli = Cli::parse();
    recipe_embedder::run(cli).await
}
