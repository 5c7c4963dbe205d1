use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "chatstash")]
#[command(author, version, about = "Chat history service with Gemini text generation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Bind host (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Chat record directory (overrides storage.root_path)
        #[arg(long)]
        storage_dir: Option<String>,
    },

    /// List stored chats, newest first
    List {
        /// Only show the five most recent chats
        #[arg(short, long)]
        latest: bool,

        #[arg(long)]
        storage_dir: Option<String>,
    },

    /// Print one stored chat
    Show {
        id: String,

        #[arg(long)]
        storage_dir: Option<String>,
    },

    /// Send a single prompt to the text-generation API
    Generate {
        prompt: String,

        /// Model name (default: llm.model)
        #[arg(short, long)]
        model: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["chatstash", "serve", "--port", "8080", "--storage-dir", "/tmp/chats"]);
        match cli.command {
            Commands::Serve { host, port, storage_dir } => {
                assert!(host.is_none());
                assert_eq!(port, Some(8080));
                assert_eq!(storage_dir.as_deref(), Some("/tmp/chats"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_list_latest() {
        let cli = Cli::parse_from(["chatstash", "list", "-l"]);
        assert!(matches!(cli.command, Commands::List { latest: true, .. }));
    }

    #[test]
    fn test_help_and_bad_arguments_stop_at_parsing() {
        let err = Cli::try_parse_from(["chatstash", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["chatstash", "serve", "--port", "not-a-port"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
