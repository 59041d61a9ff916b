use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "view-router-cli")]
#[command(about = "Control CLI for the drone viewer route table", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the route tree
    Routes,
    /// Resolve a path without navigating
    Resolve { path: String },
    /// Navigate to a path
    Navigate { path: String },
    /// Navigate to a named route
    Go {
        name: String,
        /// Route parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Show the active views
    Current,
    /// Step back in history
    Back,
    /// Step forward in history
    Forward,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Routes => client.get(format!("{}/api/routes", base)).send().await?,
        Commands::Resolve { path } => {
            client
                .get(format!("{}/api/resolve", base))
                .query(&[("path", path)])
                .send()
                .await?
        }
        Commands::Navigate { path } => {
            client
                .post(format!("{}/api/navigate", base))
                .json(&json!({ "path": path }))
                .send()
                .await?
        }
        Commands::Go { name, params } => {
            let params: Map<String, Value> = params
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            client
                .post(format!("{}/api/navigate", base))
                .json(&json!({ "name": name, "params": params }))
                .send()
                .await?
        }
        Commands::Current => client.get(format!("{}/api/current", base)).send().await?,
        Commands::Back => client.post(format!("{}/api/back", base)).send().await?,
        Commands::Forward => client.post(format!("{}/api/forward", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if status == reqwest::StatusCode::NO_CONTENT {
        println!("(nothing active)");
        return Ok(());
    }

    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: control API returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
