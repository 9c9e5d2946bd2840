//! The bundled API server as a background process, tracked through a PID file
//! and probed through its health endpoint.

use crate::cli::ServeCommand;
use anyhow::{Context, Result, anyhow};
use cloud_todo::api;
use cloud_todo::backend::{HttpBackend, LocalBackend};
use cloud_todo::utils::paths::{get_database_path, get_pid_file_path};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

const HEALTH_TIMEOUT: Duration = Duration::from_millis(500);
const STARTUP_POLLS: u32 = 10;
const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn read(&self) -> Result<Option<u32>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let pid = content
            .trim()
            .parse()
            .with_context(|| format!("Invalid PID file {}", self.path.display()))?;
        Ok(Some(pid))
    }

    pub fn write(&self, pid: u32) -> Result<()> {
        fs::write(&self.path, pid.to_string())?;
        Ok(())
    }

    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Running { pid: Option<u32> },
    /// PID file left behind by a server that no longer answers
    Stale { pid: u32 },
    Stopped,
}

impl ServerStatus {
    pub fn describe(&self, port: u16) -> String {
        match self {
            Self::Running { pid: Some(pid) } => {
                format!("Server is running on port {port} (PID: {pid})")
            }
            Self::Running { pid: None } => {
                format!("Server is running on port {port} but no PID file found")
            }
            Self::Stale { pid } => format!(
                "Server PID file exists ({pid}) but server is not responding on port {port}\n\
                 Consider running 'cloudtodo serve stop' to clean up"
            ),
            Self::Stopped => "Server is not running".to_string(),
        }
    }
}

pub struct LocalServer {
    port: u16,
    pid_file: PidFile,
}

impl LocalServer {
    pub fn new(port: u16) -> Result<Self> {
        Ok(Self::with_pid_file(port, PidFile::at(get_pid_file_path()?)))
    }

    fn with_pid_file(port: u16, pid_file: PidFile) -> Self {
        Self { port, pid_file }
    }

    /// Asks the health endpoint, on a throwaway runtime so it works from sync code.
    pub fn is_responding(&self) -> bool {
        let Ok(runtime) = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        else {
            return false;
        };

        match HttpBackend::new(&format!("http://127.0.0.1:{}", self.port), HEALTH_TIMEOUT) {
            Ok(http) => runtime.block_on(http.health()),
            Err(_) => false,
        }
    }

    pub fn status(&self) -> Result<ServerStatus> {
        let pid = self.pid_file.read()?;
        Ok(match (self.is_responding(), pid) {
            (true, pid) => ServerStatus::Running { pid },
            (false, Some(pid)) => ServerStatus::Stale { pid },
            (false, None) => ServerStatus::Stopped,
        })
    }

    /// Spawns `serve start --daemon` in the background and waits for it to
    /// answer. Returns false when a server was already up.
    pub fn start(&self) -> Result<bool> {
        if self.is_responding() {
            return Ok(false);
        }

        let child = Command::new(std::env::current_exe()?)
            .args(["serve", "start", "--port", &self.port.to_string(), "--daemon"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.pid_file.write(child.id())?;

        for _ in 0..STARTUP_POLLS {
            std::thread::sleep(STARTUP_POLL_INTERVAL);
            if self.is_responding() {
                return Ok(true);
            }
        }
        Err(anyhow!(
            "Failed to start server - not responding on port {}",
            self.port
        ))
    }

    /// Kills the recorded process. Returns its PID, or None without a PID file.
    pub fn stop(&self) -> Result<Option<u32>> {
        let Some(pid) = self.pid_file.read()? else {
            return Ok(None);
        };
        kill_process(pid)?;
        self.pid_file.remove()?;
        Ok(Some(pid))
    }
}

#[cfg(unix)]
fn kill_process(pid: u32) -> Result<()> {
    Command::new("kill").arg(pid.to_string()).output()?;
    Ok(())
}

#[cfg(windows)]
fn kill_process(pid: u32) -> Result<()> {
    Command::new("taskkill")
        .args(["/F", "/PID", &pid.to_string()])
        .output()?;
    Ok(())
}

pub fn handle_serve_command(command: Option<ServeCommand>, port: u16) -> Result<()> {
    let command = command.unwrap_or(ServeCommand::Start { daemon: false });
    if let ServeCommand::Start { daemon: true } = command {
        return run_foreground(port);
    }

    let server = LocalServer::new(port)?;
    match command {
        ServeCommand::Start { .. } => start(&server),
        ServeCommand::Stop => stop(&server),
        ServeCommand::Restart => {
            let _ = stop(&server);
            std::thread::sleep(Duration::from_millis(500));
            start(&server)
        }
        ServeCommand::Status => {
            println!("{}", server.status()?.describe(port));
            Ok(())
        }
    }
}

fn start(server: &LocalServer) -> Result<()> {
    if server.start()? {
        println!("Server started on port {}", server.port);
    } else {
        println!("Server is already running on port {}", server.port);
    }
    Ok(())
}

fn stop(server: &LocalServer) -> Result<()> {
    match server.stop()? {
        Some(pid) => println!("Server stopped (PID: {pid})"),
        None => println!("Server is not running (no PID file found)"),
    }
    Ok(())
}

/// Starts the local server unless something already answers on `port`.
pub fn ensure_running(port: u16) -> Result<()> {
    let server = LocalServer::new(port)?;
    if !server.is_responding() {
        println!("Starting API server on port {port}...");
        server.start()?;
    }
    Ok(())
}

#[tokio::main]
async fn run_foreground(port: u16) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let backend = LocalBackend::open(&get_database_path()?)?;
    let app = api::create_router(backend);
    let addr = format!("127.0.0.1:{port}");

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
