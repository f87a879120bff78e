use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gatewayctl")]
#[command(about = "Admin CLI for the job market API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long)]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show gateway status and rate limit settings
    Status,
    /// Show the live rate limit window for a client address
    Inspect {
        /// Client address as it appears in X-Forwarded-For or on the socket
        client: String,
    },
    /// Evict expired rate limit windows now
    Sweep,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let request = match &cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Inspect { client: address } => {
            client.get(format!("{}/admin/limits/{}", cli.url, address))
        }
        Commands::Sweep => client.post(format!("{}/admin/sweep", cli.url)),
    };

    let res = request.headers(headers).send().await?;
    let inspecting = matches!(cli.command, Commands::Inspect { .. });
    print_response(res, inspecting).await
}

async fn print_response(
    res: reqwest::Response,
    inspecting: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if inspecting && status == reqwest::StatusCode::NOT_FOUND {
        eprintln!("No live rate limit window for that client");
        return Ok(());
    }
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
