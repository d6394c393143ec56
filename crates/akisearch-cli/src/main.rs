use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use akisearch_client::{CancellationToken, SearchClient};
use akisearch_core::Connection;
use akisearch_query::create_formatter;

mod args;

use args::{ConnectionArgs, RequestArgs};

#[derive(Parser, Debug)]
#[command(name = "akisearch")]
#[command(about = "Compile and run searches against a search service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the wire request a search compiles to, without sending it
    Compile {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Execute a search and print the hits
    Search {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[command(flatten)]
        request: RequestArgs,

        /// Print the raw response instead of one hit per line
        #[arg(long)]
        raw: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            connection,
            request,
        } => {
            let config = connection.load()?;
            let connection = Connection::try_from(&config.connection)?;
            let request = request.to_request()?;

            let formatted = create_formatter(&connection, &request).format()?;
            println!("{} {}", formatted.method, formatted.uri);
            if let Some(body) = formatted.body {
                let body: serde_json::Value = serde_json::from_str(&body)?;
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
        }

        Commands::Search {
            connection,
            request,
            raw,
        } => {
            let config = connection.load()?;
            let client = SearchClient::from_config(&config)?;
            let request = request.to_request()?;

            let token = CancellationToken::new();
            let canceller = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling search");
                    canceller.cancel();
                }
            });

            let response = client.search(&request, &token).await?;

            if raw {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                for hit in response.hits() {
                    let document = hit
                        .source
                        .clone()
                        .or_else(|| hit.fields.clone().map(serde_json::Value::Object))
                        .unwrap_or(serde_json::Value::Null);
                    println!("{}\t{}", hit.id, document);
                }
                println!(
                    "{} of {} hits ({} ms)",
                    response.hits().len(),
                    response.total(),
                    response.took
                );
            }
        }
    }

    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
