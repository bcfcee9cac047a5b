//! Asset Console - browse and edit a remote content repository's assets.
//!
//! This binary starts the proxy server, or browses and checks an instance
//! from the terminal.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use asset_console::{
    actions::{ActionDefaults, ActionService},
    browse::{AssetPath, Navigator},
    config::{BrowseConfig, CheckConfig, Cli, Command, ServeConfig},
    server::{create_router, ConsoleSettings, RouterConfig},
    upstream::{AssetLocation, HttpUpstream, PageRequest, Upstream},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Browse(config) => run_browse(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    print_banner();

    info!("Configuration:");
    match config.instance {
        Some(ref instance) => info!("  Default instance: {}", instance),
        None => info!("  Default instance: none (clients must send one)"),
    }
    info!("  API prefix: {}", config.api);
    match config.allowed_instances {
        Some(ref allowed) => info!("  Allowed instances: {}", allowed.join(", ")),
        None => warn!("  Allowed instances: ANY - requests may target any host"),
    }
    match config.translate_endpoint {
        Some(ref endpoint) => info!("  Translation: {}", endpoint),
        None => warn!("  Translation: not configured, the translate action will fail"),
    }
    info!("  Upstream timeout: {}s", config.upstream_timeout);
    info!("  Page size: {}", config.page_size);

    let mut upstream = match HttpUpstream::new(config.upstream_timeout()) {
        Ok(upstream) => upstream,
        Err(e) => {
            error!("Failed to create upstream client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(endpoint) = config.translate_url() {
        upstream = upstream.with_translate_endpoint(endpoint);
    }

    let actions = ActionService::new(upstream).with_defaults(ActionDefaults {
        instance: config.instance.clone(),
        api: Some(config.api.clone()),
        allowed_instances: config.allowed_instances.clone(),
    });

    let console = ConsoleSettings {
        instance: config.instance.clone(),
        api: config.api.clone(),
        page_size: config.page_size,
        fragment_model: config.fragment_model.clone(),
        ..ConsoleSettings::default()
    };

    let router = create_router(actions, console, build_router_config(&config));

    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Open the console in your browser:");
    info!("    open http://{}/", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -X POST -H 'Authorization: Bearer <token>' http://{}/api/v1/read",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Print the startup banner.
fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    info!("");
    info!(" █████╗ ███████╗███████╗███████╗████████╗███████╗");
    info!("██╔══██╗██╔════╝██╔════╝██╔════╝╚══██╔══╝██╔════╝");
    info!("███████║███████╗███████╗█████╗     ██║   ███████╗");
    info!("██╔══██║╚════██║╚════██║██╔══╝     ██║   ╚════██║");
    info!("██║  ██║███████║███████║███████╗   ██║   ███████║");
    info!("╚═╝  ╚═╝╚══════╝╚══════╝╚══════╝   ╚═╝   ╚══════╝");
    info!("");
    info!("                 console v{}", version);
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "asset_console=debug,tower_http=debug"
    } else {
        "asset_console=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application ServeConfig.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new();

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Browse Command
// =============================================================================

async fn run_browse(config: BrowseConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let upstream = match HttpUpstream::new(std::time::Duration::from_secs(config.upstream_timeout))
    {
        Ok(upstream) => Arc::new(upstream),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut navigator = Navigator::new(
        upstream,
        config.instance.as_str(),
        config.api.as_str(),
        config.token.as_str(),
    )
    .with_page_size(config.page_size);

    if let Err(e) = navigator.navigate(AssetPath::new(&config.path)).await {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    if config.all {
        if let Err(e) = navigator.load_all().await {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let trail: Vec<String> = navigator
        .breadcrumbs()
        .into_iter()
        .map(|crumb| crumb.name)
        .collect();
    println!("{}", trail.join(" › "));
    println!("─────────────────");

    let listing = navigator.listing();
    if listing.items().is_empty() {
        println!("  (empty folder)");
    }
    for item in listing.items() {
        println!(
            "  {:<8} {:<40} {}",
            item.kind(),
            item.label(),
            navigator
                .path()
                .console_url(&config.instance, &item.properties.name)
        );
    }

    println!();
    match listing.total() {
        Some(total) => println!("Showing {} of {} item(s)", listing.items().len(), total),
        None => println!("Showing {} item(s)", listing.items().len()),
    }
    if listing.has_more() {
        println!("Tip: Use --all to load every page");
    }

    if config.thumbnails {
        let queued = navigator.request_thumbnails();
        println!();
        println!("Thumbnails ({} requested):", queued);

        while let Some(result) = navigator.thumbnails().next_ready().await {
            match result.outcome {
                Ok(Some(thumbnail)) => println!(
                    "  ✓ {} ({}, {} bytes)",
                    result.path,
                    thumbnail.mime_type,
                    thumbnail.data.len()
                ),
                Ok(None) => println!("  - {} (no thumbnail)", result.path),
                Err(e) => println!("  ✗ {}: {}", result.path, e),
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("Asset Console Configuration Check");
    println!("═════════════════════════════════");
    println!();

    if let Err(e) = config.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }

    println!("✓ Instance: {}", config.instance);
    println!("✓ API prefix: {}", config.api);
    println!();

    let upstream = match HttpUpstream::new(std::time::Duration::from_secs(
        asset_console::upstream::DEFAULT_UPSTREAM_TIMEOUT_SECS,
    )) {
        Ok(upstream) => upstream,
        Err(e) => {
            println!("✗ Client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    print!("Listing the repository root... ");

    let location = AssetLocation::new(config.instance.as_str(), config.api.as_str(), "");
    match upstream
        .list(&location, &config.token, PageRequest::first(1))
        .await
    {
        Ok(_) => {
            println!("✓ success");
        }
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            println!();
            println!("Please check:");
            println!("  - The token is valid and has not expired");
            println!("  - The instance '{}' is reachable", config.instance);
            if e.status() == Some(404) {
                println!("  - The API prefix '{}' is correct", config.api);
            }
            return ExitCode::FAILURE;
        }
    }

    println!();
    println!("═════════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
