mod app;
mod cli;
mod server;
mod ui;

use cloud_todo::backend::{Backend, HttpBackend, LocalBackend};
use cloud_todo::config::Config;
use cloud_todo::todo::{TodoItem, TodoView};
use cloud_todo::upload::{SelectedFile, UploadEvent, UploadWidget};
use cloud_todo::utils::format::format_transfer;
use cloud_todo::utils::paths::{
    ensure_data_dir_exists, get_crash_log_path, get_database_path, get_logs_dir,
};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::Parser;
use cli::{Cli, Commands};
use std::fs;
use std::io::Write;
use std::panic;
use std::path::Path;
use tokio::runtime::Runtime;
use ui::theme::Theme;

/// Install a panic hook that writes crash information to a log file
fn install_crash_handler() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if let Ok(crash_log_path) = get_crash_log_path() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let mut crash_report = format!("=== CRASH at {timestamp} ===\n");

            if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
                crash_report.push_str(&format!("Message: {message}\n"));
            } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
                crash_report.push_str(&format!("Message: {message}\n"));
            }

            if let Some(location) = panic_info.location() {
                crash_report.push_str(&format!(
                    "Location: {}:{}:{}\n",
                    location.file(),
                    location.line(),
                    location.column()
                ));
            }

            crash_report.push_str(&format!(
                "\nBacktrace:\n{}\n\n",
                std::backtrace::Backtrace::force_capture()
            ));

            if let Ok(mut file) = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log_path)
            {
                let _ = file.write_all(crash_report.as_bytes());
                eprintln!("\nCrash logged to: {}", crash_log_path.display());
            }
        }

        default_hook(panic_info);
    }));
}

/// Initialize file-based logging for the TUI and one-shot commands.
///
/// Logs are written to ~/.cloud-todo/logs/cloudtodo.log.<date>.
/// Log level can be controlled with RUST_LOG env var (default: info).
fn init_file_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let logs_dir = get_logs_dir().ok()?;

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Warning: Could not create logs directory: {e}");
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "cloudtodo.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Some(guard)
}

fn main() -> Result<()> {
    install_crash_handler();
    ensure_data_dir_exists()?;

    let cli = Cli::parse();
    let config = Config::load()?;

    if let Some(Commands::Serve { command, port }) = cli.command {
        return server::handle_serve_command(command, port);
    }

    // Guard must be kept alive for the duration of the app
    let _log_guard = init_file_logging();
    let runtime = Runtime::new().context("Failed to start async runtime")?;
    let backend = connect_backend(&config, cli.offline)?;

    match cli.command {
        Some(Commands::Add { content }) => handle_add(&runtime, &backend, content),
        Some(Commands::List) => handle_list(&runtime, &backend),
        Some(Commands::Upload { path, prefix }) => {
            let prefix = prefix.unwrap_or_else(|| config.upload_prefix.clone());
            handle_upload(&runtime, &backend, &path, prefix)
        }
        Some(Commands::Serve { .. }) => unreachable!("serve is handled before connecting"),
        None => run_tui_mode(&runtime, backend, &config),
    }
}

fn run_tui_mode(runtime: &Runtime, backend: Backend, config: &Config) -> Result<()> {
    tracing::info!(backend = %backend.describe(), "cloudtodo starting");

    let theme = Theme::from_config(config);
    let mut state = app::AppState::new(backend, runtime.handle().clone(), theme, config);
    runtime
        .block_on(state.mount())
        .context("Could not subscribe to the todo list")?;

    ui::run_tui(state)?;

    tracing::info!("cloudtodo exiting gracefully");
    Ok(())
}

/// Offline runs against the local database directly; otherwise the HTTP
/// backend is used, starting the local server first when it is the target.
fn connect_backend(config: &Config, offline: bool) -> Result<Backend> {
    if offline {
        let path = get_database_path()?;
        return Ok(Backend::Local(LocalBackend::open(&path)?));
    }

    if config.uses_local_server() {
        server::ensure_running(config.api_port)?;
    }

    let http = HttpBackend::new(&config.backend_url, config.request_timeout())?;
    Ok(Backend::Http(http))
}

fn handle_add(runtime: &Runtime, backend: &Backend, content: Option<String>) -> Result<()> {
    let content = match content {
        Some(content) => content,
        None => dialoguer::Input::<String>::new()
            .with_prompt("Todo")
            .allow_empty(true)
            .interact_text()?,
    };

    let view = TodoView::new();
    let item = runtime.block_on(view.create(backend, Some(content)))?;

    println!("✓ Todo added ({})", item.id);
    Ok(())
}

fn handle_list(runtime: &Runtime, backend: &Backend) -> Result<()> {
    let items: Vec<TodoItem> = runtime.block_on(async {
        let mut view = TodoView::new();
        view.mount(backend).await?;
        let items = view.next_snapshot().await.map(<[TodoItem]>::to_vec);
        Ok::<_, anyhow::Error>(items.unwrap_or_default())
    })?;

    if items.is_empty() {
        println!("No todos yet!");
        return Ok(());
    }

    println!("\n📋 Todo List\n");
    for (idx, item) in items.iter().enumerate() {
        let created = item.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        println!("{:>3}. {}  ({created})", idx + 1, item.display_content());
    }
    println!();

    Ok(())
}

fn handle_upload(runtime: &Runtime, backend: &Backend, path: &Path, prefix: String) -> Result<()> {
    let file = SelectedFile::from_path(path)?;
    let mut widget = UploadWidget::new().with_key_prefix(prefix);
    widget.select_file(file);

    runtime.block_on(async {
        if widget.submit(backend).is_none() {
            return;
        }
        while let Some(event) = widget.next_event().await {
            if let UploadEvent::Progress(progress) = event {
                print!(
                    "\r{:>3}%  {}",
                    widget.state().progress_percent,
                    format_transfer(progress.loaded, progress.total)
                );
                let _ = std::io::stdout().flush();
            }
        }
    });
    println!();

    let state = widget.state();
    match (&state.completed_key, &state.error_message) {
        (Some(key), _) => {
            println!("✓ Uploaded: {key}");
            Ok(())
        }
        (None, Some(error)) => Err(anyhow!("{error}")),
        (None, None) => Err(anyhow!("Upload did not complete")),
    }
}
