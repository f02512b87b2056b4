mod actions;
mod app;
mod cli;
mod component;
mod config;
mod libs;
mod page;
#[cfg(not(tarpaulin_include))]
mod tui;
mod utils;

use app::{App, RootState};
use clap::Parser;
use color_eyre::eyre::Result;
use dotenv::dotenv;

#[cfg(not(tarpaulin_include))]
async fn run(args: cli::Cli, config: config::Config) -> Result<()> {
    use cli::Commands;

    match &args.command {
        Some(Commands::Parse { text }) => {
            println!("{}", cli::parse_report(&text.join(" "), &config.field, None));
            Ok(())
        }
        None => {
            let state = RootState::new(config);
            let mut app = App::new(
                state,
                tui::Tui::new()?
                    .tick_rate(args.tick_rate)
                    .frame_rate(args.frame_rate)
                    .into(),
            );

            app.run().await?;
            Ok(())
        }
    }
}

#[tokio::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> Result<()> {
    use cli::ClapSource;
    use color_eyre::eyre::Context;

    dotenv().ok();
    utils::errors::init()?;

    let args = cli::Cli::parse();
    let config = config::Config::new(Some(ClapSource::new(&args)))
        .context("Error when loading config")?;
    utils::logging::init(&config.config.data_dir)?;
    tracing::info!(
        data_dir = %config.config.data_dir.display(),
        "starting {}",
        env!("CARGO_PKG_NAME")
    );
    trace_dbg!(&config.field);

    run(args, config).await
}
