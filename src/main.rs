use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use trawl::server::{self, ServerState};
use trawl::{report, App};
use trawl_core::config::Config;

#[derive(Parser)]
#[command(name = "trawl", about = "trawl: natural-language search over distributed traces")]
struct Cli {
    /// Config file (default: ~/.config/trawl/config.toml, if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Trace corpus to load, overriding `[corpus] path`.
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Log at debug level to stderr (RUST_LOG overrides).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the corpus with a natural-language query.
    Search { text: String },
    /// Explain a whole trace by corpus index.
    ExplainTrace { index: usize },
    /// Explain one span, counted across the trace's resources and scopes.
    ExplainSpan { trace: usize, span: usize },
    /// Write a synthetic corpus.
    Generate {
        #[arg(long, default_value_t = 100)]
        count: usize,
        #[arg(long, default_value = "traces_bench.json")]
        out: PathBuf,
    },
    /// Serve search and explanations over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Command::Generate { count, out } => generate(count, &out),
        command => {
            let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
            let app = App::from_config(&config, cli.corpus.as_deref())?;
            run(app, command).await
        }
    }
}

fn generate(count: usize, out: &Path) -> anyhow::Result<()> {
    let traces = trawl_store::generate_traces(count);
    trawl_store::write_traces(out, &traces)?;
    println!("wrote {} traces to {}", traces.len(), out.display());
    Ok(())
}

async fn run(app: App, command: Command) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted; cancelling");
                cancel.cancel();
            }
        }
    });

    match command {
        Command::Search { text } => {
            let result = app.service().search(&cancel, &text).await?;
            report::write_search_result(&mut std::io::stdout().lock(), &result)?;
        }
        Command::ExplainTrace { index } => {
            let trace = app.trace(index)?;
            println!("=== EXPLAIN TRACE {index} ===");
            println!("{}", app.service().explain_trace(trace).await?);
        }
        Command::ExplainSpan { trace, span } => {
            let service = app
                .span(trace, span)?
                .service_name()
                .unwrap_or(trawl::UNKNOWN_SERVICE)
                .to_string();
            println!("=== EXPLAIN SPAN {span} (TRACE {trace}) SERVICE: {service} ===");
            println!("{}", app.explain_span(trace, span).await?);
        }
        Command::Serve { addr } => {
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            tracing::info!(addr = %listener.local_addr()?, "serving");
            let state = Arc::new(ServerState {
                app,
                shutdown: cancel.clone(),
            });
            axum::serve(listener, server::router(state))
                .with_graceful_shutdown(cancel.cancelled_owned())
                .await?;
        }
        Command::Generate { count, out } => generate(count, &out)?,
    }

    Ok(())
}
