mod client;
mod config;
mod ui;

use anyhow::Result;
use client::ApiClient;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return Err(e);
        }
    };

    // Parse args
    let args: Vec<String> = std::env::args().collect();

    // Create API client
    let client = ApiClient::new(config.server_url.clone());

    // Handle commands — default to chat if no args
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("chat");

    match command {
        "chat" => {
            ui::interactive_chat(client).await?;
        }
        "config" => {
            if args.len() < 3 {
                println!("Current config:");
                println!("  Server URL: {}", config.server_url);
            } else if args[2] == "set" && args.len() >= 5 {
                match args[3].as_str() {
                    "server" => {
                        config.server_url = args[4].clone();
                        config.save()?;
                        println!("Server URL updated to: {}", config.server_url);
                    }
                    _ => print_usage(),
                }
            } else {
                print_usage();
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            // Treat everything else as a question
            let message = args[1..].join(" ");
            ui::single_message(client, message).await?;
        }
    }

    Ok(())
}

fn print_usage() {
    println!("Envoy - Client for the Shelfwise library assistant");
    println!("\nUsage:");
    println!("  envoy chat                    Start interactive chat");
    println!("  envoy \"your question\"         Ask a single question");
    println!("  envoy config                  Show current configuration");
    println!("  envoy config set server URL   Set server URL");
}
