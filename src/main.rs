use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tokio::signal;
use tracing::{info, warn};

use rtt_monitor::config::{self, Cli, Command, SampleArgs, ServeArgs};
use rtt_monitor::sampler::{render, Sampler, Scheduler};
use rtt_monitor::server::ServerHandle;
use rtt_monitor::stats::RttStore;
use rtt_monitor::{logging, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Sample(args) => sample(args).await,
    }
}

// ─── Aggregator ──────────────────────────────────────────────────

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    args.validate()?;

    // Constructed once, injected into every handler
    let state = AppState::new(Arc::new(RttStore::new()));

    let server = ServerHandle::spawn(args.bind, state.clone(), &args.static_dir)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;

    let addr = server.local_addr();
    info!("page    → http://{addr}/");
    info!("ping    → POST http://{addr}/ping");
    info!("stats   → GET  http://{addr}/stats/{{clientId}}");

    shutdown_signal().await;
    info!(clients = state.store.client_count(), "shutting down");
    server.shutdown().await?;
    Ok(())
}

// ─── Sampler ─────────────────────────────────────────────────────

async fn sample(args: SampleArgs) -> anyhow::Result<()> {
    args.validate()?;

    let sampler = Arc::new(Sampler::new(
        &args.server,
        args.client_id.clone(),
        args.timeout(),
    )?);
    let mut views = sampler.subscribe();

    let mut scheduler = Scheduler::new(sampler.clone());
    scheduler.start(args.interval()?);

    info!(
        client_id = sampler.client_id(),
        server = %args.server,
        "type a number of seconds and press enter to change the interval"
    );

    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let text = render::render(&views.borrow_and_update());
                // Clear screen, home cursor
                print!("\x1b[2J\x1b[H{text}");
                let _ = std::io::stdout().flush();
            }
            line = lines.recv(), if stdin_open => {
                match line {
                    Some(line) => apply_interval(&mut scheduler, line.trim()),
                    None => stdin_open = false,
                }
            }
            _ = &mut shutdown => break,
        }
    }

    scheduler.stop();
    Ok(())
}

/// Forward stdin lines from a plain thread so a pending read never holds
/// up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

fn apply_interval(scheduler: &mut Scheduler, input: &str) {
    if input.is_empty() {
        return;
    }
    let parsed = input
        .parse::<f64>()
        .map_err(|e| rtt_monitor::RttError::config(e.to_string()))
        .and_then(config::parse_interval);
    match parsed {
        Ok(interval) => scheduler.set_interval(interval),
        Err(err) => warn!(error = %err, input, "interval unchanged"),
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    let mut term = match unix_signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(_) => {
            let _ = signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = signal::ctrl_c() => {},
        _ = term.recv() => {},
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
}
