pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, cmd_browse, cmd_popular, cmd_search, cmd_trending};
pub use config::Config;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    if prometheus_handle.is_some() {
        info!("Prometheus metrics recorder initialized");
    }

    let Some(command) = cli.command else {
        print_help();
        return Ok(());
    };

    match command {
        Commands::Serve => run_server(config, prometheus_handle).await,

        Commands::Search { query } => {
            let state = SharedState::new(config).await?;
            cmd_search(&state, &query.join(" ")).await
        }

        Commands::Popular => {
            let state = SharedState::new(config).await?;
            cmd_popular(&state).await
        }

        Commands::Trending => {
            let state = SharedState::new(config).await?;
            cmd_trending(&state).await
        }

        Commands::Browse => {
            let state = SharedState::new(config).await?;
            cmd_browse(&state).await
        }

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("Config file already exists.");
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = if config.general.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "cinetrend")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!("Cinetrend v{} starting server...", env!("CARGO_PKG_VERSION"));

    let port = config.server.port;
    let api_state = api::create_app_state_from_config(config, prometheus_handle).await?;

    // Warm the trending list so a broken store shows up in the startup log.
    let trending = api_state.shared.trending.list_trending().await;
    info!("Trending list has {} entries", trending.len());

    let app = api::router(Arc::clone(&api_state));
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://0.0.0.0:{}", port);

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Error listening for shutdown: {}", e),
        }
    });

    if let Err(e) = server.await {
        error!("Web server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}

fn print_help() {
    println!("Cinetrend v{}", env!("CARGO_PKG_VERSION"));
    println!("Movie search with trending searches");
    println!();
    println!("USAGE:");
    println!("  cinetrend <command> [args]");
    println!();
    println!("COMMANDS:");
    println!("  serve             Start the HTTP API server");
    println!("  search <query>    Search movies and count the search");
    println!("  popular           List popular movies");
    println!("  trending          Show the most searched terms");
    println!("  browse            Search interactively from stdin");
    println!("  init              Create default config file");
    println!();
    println!("CONFIG:");
    println!("  config.toml, ~/.config/cinetrend/config.toml or ~/.cinetrend/config.toml");
    println!("  CINETREND_TMDB_TOKEN and CINETREND_APPWRITE_* override file values");
}
