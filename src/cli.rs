use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use cloud_todo::config::DEFAULT_API_PORT;

#[derive(Parser, Debug)]
#[command(name = "cloudtodo")]
#[command(about = "A live todo list and file uploader for the terminal", long_about = None)]
pub struct Cli {
    /// Use an in-process backend instead of the HTTP server
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a todo (prompts for content when omitted)
    Add {
        content: Option<String>,
    },
    /// Print the current todo list
    List,
    /// Upload a file to object storage and print its key
    Upload {
        path: PathBuf,

        /// Key prefix (defaults to the configured upload prefix)
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Manage the API server
    Serve {
        #[command(subcommand)]
        command: Option<ServeCommand>,

        /// Port to run the server on
        #[arg(short, long, global = true, default_value_t = DEFAULT_API_PORT)]
        port: u16,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ServeCommand {
    /// Start the API server (default if no subcommand given)
    Start {
        #[arg(long, hide = true)]
        daemon: bool,
    },
    /// Stop the running API server
    Stop,
    /// Restart the API server
    Restart,
    /// Check if the API server is running
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_runs_tui() {
        let cli = Cli::parse_from(["cloudtodo"]);
        assert!(cli.command.is_none());
        assert!(!cli.offline);
    }

    #[test]
    fn test_add_content_is_optional() {
        let cli = Cli::parse_from(["cloudtodo", "add"]);
        assert!(matches!(cli.command, Some(Commands::Add { content: None })));

        let cli = Cli::parse_from(["cloudtodo", "--offline", "add", "Buy milk"]);
        assert!(cli.offline);
        match cli.command {
            Some(Commands::Add { content }) => assert_eq!(content.as_deref(), Some("Buy milk")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_upload_with_prefix() {
        let cli = Cli::parse_from(["cloudtodo", "upload", "report.pdf", "--prefix", "docs/"]);
        match cli.command {
            Some(Commands::Upload { path, prefix }) => {
                assert_eq!(path, PathBuf::from("report.pdf"));
                assert_eq!(prefix.as_deref(), Some("docs/"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_port_is_global() {
        let cli = Cli::parse_from(["cloudtodo", "serve", "status", "--port", "9000"]);
        match cli.command {
            Some(Commands::Serve { command, port }) => {
                assert!(matches!(command, Some(ServeCommand::Status)));
                assert_eq!(port, 9000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
