mod cli;
mod render;
mod settings;

use crate::cli::Command;
use crate::settings::AppSettings;
use log::{debug, warn};
use nba_api::{ApiError, CancellationToken, NbaApi, RequestContext};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    better_panic::install();

    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{}", cli::usage_text());
            return ExitCode::from(2);
        }
    };

    match command {
        Command::Help => {
            println!("{}", cli::usage_text());
            return ExitCode::SUCCESS;
        }
        Command::Version => {
            println!("nbastats {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let settings = match AppSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };
    setup_logger(&settings);

    match run(command, &settings).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) if is_cancelled(&e) => {
            eprintln!("Cancelled");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn setup_logger(settings: &AppSettings) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.parse_filters(settings.log_filter());
    if let Err(e) = builder.try_init() {
        eprintln!("Could not install logger: {e}");
    }
}

async fn run(command: Command, settings: &AppSettings) -> anyhow::Result<String> {
    let token = CancellationToken::new();
    let ctx = RequestContext::background().with_cancellation(token.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling request");
            token.cancel();
        }
    });

    let output = match command {
        Command::List => render::endpoint_list(),
        Command::Stats {
            endpoint,
            params,
            json,
        } => {
            let params = cli::with_defaults(endpoint, params, &nba_api::current_season());
            debug!("{} with {} parameters", endpoint.name, params.len());
            let api = NbaApi::try_from_config(settings.stats_config())?;
            let pairs = params.iter().map(|(k, v)| (k.as_str(), v.as_str()));
            let response = api.fetch_stats(&ctx, endpoint, pairs).await?;
            render::stats(&response, json)?
        }
        Command::Scoreboard => render::scoreboard(&live(settings)?.scoreboard(&ctx).await?),
        Command::BoxScore { game_id } => render::boxscore(&live(settings)?.boxscore(&ctx, &game_id).await?),
        Command::PlayByPlay { game_id } => {
            render::play_by_play(&live(settings)?.play_by_play(&ctx, &game_id).await?)
        }
        Command::Odds => render::odds(&live(settings)?.odds(&ctx).await?),
        Command::Help | Command::Version => cli::usage_text().to_owned(),
    };
    Ok(output)
}

fn live(settings: &AppSettings) -> nba_api::ApiResult<NbaApi> {
    NbaApi::try_from_config(settings.live_config())
}

fn is_cancelled(e: &anyhow::Error) -> bool {
    matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Cancelled(_)))
}
