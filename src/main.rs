use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use reno_office::config::AppConfig;
use reno_office::error::AppError;
use reno_office::quotes::{
    build_line_item, document_view, quote_router, DealSelection, EngineConfig,
    IncentiveParameters, ItemId, LineItem, LineItemDraft, MemoryQuoteRepository, QuoteId,
    QuoteService, QuoteState, TotalsEngine,
};
use reno_office::telemetry;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Renovation Back Office",
    about = "Manage energy-renovation quotes and compute incentive totals",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with quote documents offline
    Quote {
        #[command(subcommand)]
        command: QuoteCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum QuoteCommand {
    /// Compute the totals of a quote described in a JSON file
    Totals(QuoteTotalsArgs),
}

#[derive(Args, Debug)]
struct QuoteTotalsArgs {
    /// Path to a JSON quote description (items, incentives, optional deal)
    #[arg(long)]
    file: PathBuf,
    /// Emit raw JSON instead of the readable summary
    #[arg(long)]
    json: bool,
}

/// Offline quote description consumed by `quote totals`.
#[derive(Debug, Deserialize)]
struct QuoteFile {
    #[serde(default)]
    items: Vec<LineItemDraft>,
    #[serde(default)]
    incentives: IncentiveParameters,
    #[serde(default)]
    deal: Option<DealSelection>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Quote {
            command: QuoteCommand::Totals(args),
        } => run_quote_totals(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let repository = Arc::new(MemoryQuoteRepository::default());
    let service = Arc::new(QuoteService::new(repository, config.engine.clone()));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(quote_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "renovation back office ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_quote_totals(args: QuoteTotalsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = std::fs::read_to_string(&args.file)?;
    let quote_file: QuoteFile = serde_json::from_str(&raw)?;

    let (state, totals) = assemble_quote(quote_file, config.engine);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&totals)?);
        return Ok(());
    }

    render_quote_totals(&state, &totals);
    Ok(())
}

fn assemble_quote(
    quote_file: QuoteFile,
    engine_config: EngineConfig,
) -> (QuoteState, reno_office::quotes::QuoteTotals) {
    let mut state = QuoteState::new(QuoteId("devis-offline".to_string()));
    for (index, draft) in quote_file.items.into_iter().enumerate() {
        let item: LineItem = build_line_item(
            draft,
            ItemId(format!("item-{:06}", index + 1)),
            (index + 1) as u32,
        );
        state.push_item(item);
    }
    state.replace_incentives(quote_file.incentives);
    if let Some(deal) = quote_file.deal {
        state.set_deal(deal);
    }

    let engine = TotalsEngine::new(engine_config);
    let totals = engine.compute(&state.line_items, &state.incentives, state.deal.as_ref());
    (state, totals)
}

fn render_quote_totals(state: &QuoteState, totals: &reno_office::quotes::QuoteTotals) {
    let document = document_view(state, totals);

    println!("Quote {}", document.quote_id);
    if let Some(deal) = &state.deal {
        println!("Deal: {} (ratio {})", deal.deal_id, deal.deal_ratio);
    } else {
        println!("Deal: none");
    }

    println!("\nLines");
    for line in &document.lines {
        if line.quantity.is_empty() {
            println!("- {} | {}", line.reference, line.name);
        } else {
            println!(
                "- {} | {} | x{} | {} | {}",
                line.reference, line.name, line.quantity, line.unit_price_ttc, line.total_ttc
            );
        }
    }

    println!("\nTotals");
    println!("- Total HT: {}", document.totals.total_ht);
    println!("- Total TTC: {}", document.totals.total_ttc);
    println!("- Prime CEE: {}", document.totals.prime_cee);
    println!("- Prime renovation: {}", document.totals.prime_renov);
    println!("- Reste a payer: {}", document.totals.remaining);
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
