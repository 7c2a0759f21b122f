use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use gwctl::api::models::monitoring::ObservationFilter;
use gwctl::config::Args;
use gwctl::fallback::{EmptyFallback, FallbackData, StaticFallback};
use gwctl::navigation::{FileFragment, FragmentStore, MemoryFragment, Menu, RenderSignal};
use gwctl::render::{render_notice, render_view};
use gwctl::{AdminClient, Config, MemorySurface, ReqwestHttpClient, ViewModel, telemetry};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

type Console = ViewModel<ReqwestHttpClient>;

/// Quiet period before redrawing after a state change, so a burst of updates draws once.
const REDRAW_DEBOUNCE: Duration = Duration::from_millis(100);

const HELP: &str = "commands: dashboard | projects | apikeys | instances | monitoring | \
                    reload | pause | help | quit";

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}

fn draw(console: &Console) {
    let state = console.snapshot();
    println!("{}", render_view(&state, &console.settings().thresholds, Local::now().naive_local()));
    for notice in console.take_notices() {
        println!("{}", render_notice(&notice));
    }
}

/// Draw the console whenever it changes, and acknowledge frame requests once drawn.
async fn host(console: Console, shutdown: CancellationToken) {
    let mut requests = console.render_signal().requests();
    let mut changes = console.subscribe();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = requests.changed() => {
                if changed.is_err() {
                    break;
                }
                let frame = *requests.borrow_and_update();
                draw(&console);
                console.render_signal().mark_rendered(frame);
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                tokio::time::sleep(REDRAW_DEBOUNCE).await;
                changes.borrow_and_update();
                draw(&console);
            }
        }
    }
}

/// Apply one operator command. Returns false when the operator asked to quit.
async fn handle_command(console: &Console, line: &str) -> bool {
    match line.trim() {
        "" => {}
        "q" | "quit" | "exit" => return false,
        "r" | "reload" => console.reload().await,
        "p" | "pause" => {
            let paused = console.toggle_auto_refresh().await;
            println!("auto-refresh {}", if paused { "paused" } else { "resumed" });
        }
        "h" | "help" => println!("{HELP}"),
        other => match other.parse::<Menu>() {
            Ok(menu) => console.select_menu(menu).await,
            Err(e) => println!("{e}\n{HELP}"),
        },
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;
    tracing::debug!("{:?}", args);

    let http = ReqwestHttpClient::new(config.base_url.clone(), Some(config.request_timeout));
    let client = AdminClient::new(Arc::new(http), config.monitoring_api);

    let fragment: Arc<dyn FragmentStore> = match &config.state_file {
        Some(path) => Arc::new(FileFragment::new(path.clone())),
        None => Arc::new(MemoryFragment::default()),
    };
    if let Some(menu) = args.menu {
        fragment.write(menu.as_str());
    }

    let fallback: Arc<dyn FallbackData> = if config.use_fallback_data {
        Arc::new(StaticFallback)
    } else {
        Arc::new(EmptyFallback)
    };

    let render = if args.once { RenderSignal::headless() } else { RenderSignal::new() };

    let console = ViewModel::builder(client, Arc::new(MemorySurface::with_monitoring_mounts()))
        .settings(config.view_settings())
        .fallback(fallback)
        .fragment_store(fragment)
        .render_signal(render)
        .build();
    console.set_observation_filter(ObservationFilter {
        time_window: config.time_window,
        ..Default::default()
    });
    console.set_time_range(config.time_range);

    if args.once {
        console.initialize().await;
        draw(&console);
        console.teardown();
        return Ok(());
    }

    let host_shutdown = CancellationToken::new();
    let host_task = tokio::spawn(host(console.clone(), host_shutdown.clone()));

    console.initialize().await;
    println!("{HELP}");

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !handle_command(&console, &line).await {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    console.teardown();
    host_shutdown.cancel();
    host_task.await?;
    Ok(())
}
