use clap::{Parser, Subcommand};
use docsearch::Result;
use docsearch::commands::{run_query, serve, show_config, show_status, upload_document};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Generative AI document search over a hosted vector index")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web UI
    Serve,
    /// Upload and embed a document file
    Upload {
        /// Path to a UTF-8 text file
        file: PathBuf,
    },
    /// Answer a query from the indexed documents
    Query {
        /// The query text
        text: String,
    },
    /// Show the resolved configuration
    Config,
    /// Report connectivity to the external providers
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            serve().await?;
        }
        Commands::Upload { file } => {
            upload_document(&file)?;
        }
        Commands::Query { text } => {
            run_query(&text)?;
        }
        Commands::Config => {
            show_config()?;
        }
        Commands::Status => {
            show_status()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["docsearch", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Status);
        }
    }

    #[test]
    fn upload_command_with_file() {
        let cli = Cli::try_parse_from(["docsearch", "upload", "notes.txt"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Upload { file } = parsed.command {
                assert_eq!(file, PathBuf::from("notes.txt"));
            }
        }
    }

    #[test]
    fn query_command_with_text() {
        let cli = Cli::try_parse_from(["docsearch", "query", "What color is the sky?"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Query { text } = parsed.command {
                assert_eq!(text, "What color is the sky?");
            }
        }
    }

    #[test]
    fn serve_command() {
        let cli = Cli::try_parse_from(["docsearch", "serve"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Serve);
        }
    }

    #[test]
    fn config_command() {
        let cli = Cli::try_parse_from(["docsearch", "config"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            assert!(matches!(parsed.command, Commands::Config));
        }
    }

    #[test]
    fn config_rejects_unknown_flags() {
        let cli = Cli::try_parse_from(["docsearch", "config", "--show"]);
        assert!(cli.is_err());
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["docsearch", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["docsearch", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
