use clap::{Parser, Subcommand};
use common::{Entry, RangeQuery};
use reqwest::{Client, Response};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// API base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    api: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a journal entry
    Add {
        user: String,
        content: String,

        /// Shared secret sent as a bearer token
        #[arg(long, env = "JOURNAL_API_KEY", hide_env_values = true)]
        key: String,
    },

    /// Show the most recent entry
    Last,

    /// List entries between two dates (YYYY-MM-DD, inclusive)
    Query { start: String, end: String },

    /// Check that the server can reach its database
    Health,
}

/// Prints the body of a failed response and exits non-zero.
async fn check(resp: Response) -> Result<Response, Box<dyn std::error::Error>> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    eprintln!("{status}: {}", body.trim_end());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Add { user, content, key } => {
            let body = Entry::new(user, content);

            let resp = client
                .post(format!("{}/new", cli.api))
                .bearer_auth(key)
                .json(&body)
                .send()
                .await?;
            let stored: Entry = check(resp).await?.json().await?;
            println!("[{}] {}: {}", stored.time, stored.user, stored.content);
        }

        Commands::Last => {
            let resp = client.get(format!("{}/last", cli.api)).send().await?;
            println!("{}", check(resp).await?.text().await?.trim_end());
        }

        Commands::Query { start, end } => {
            let range = RangeQuery {
                start: Some(start),
                end: Some(end),
            };

            let resp = client
                .get(format!("{}/query", cli.api))
                .query(&range)
                .send()
                .await?;
            let list: Vec<Entry> = check(resp).await?.json().await?;
            for e in list {
                println!("[{}] {}: {}", e.time, e.user, e.content);
            }
        }

        Commands::Health => {
            let resp = client.get(format!("{}/health", cli.api)).send().await?;
            println!("{}", check(resp).await?.text().await?.trim_end());
        }
    }

    Ok(())
}
