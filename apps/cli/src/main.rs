//! Veritas CLI - 命令行交互接口

mod client;
mod command;

use std::io::{self, BufRead, Write};

use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::GatewayClient;
use crate::command::{Command, HELP};

const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "veritas_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("VERITAS_URL").unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
    let client = GatewayClient::new(base_url);
    tracing::debug!(url = %client.base_url(), "gateway client ready");

    println!("Veritas CLI v{}", env!("CARGO_PKG_VERSION"));
    println!("Gateway: {}", client.base_url());
    println!("Type 'help' for available commands, 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("vt> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let command = match command::parse(&input) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                println!("Type 'help' for available commands.");
                continue;
            }
        };

        if command == Command::Quit {
            println!("Goodbye!");
            break;
        }

        if let Err(e) = run(&client, command).await {
            tracing::debug!(error = ?e, "command failed");
            println!("Error: {e:#}");
        }
    }

    Ok(())
}

async fn run(client: &GatewayClient, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Ask { prompt } => {
            let body = client.ask(&prompt).await?;
            println!("[{}] {}", field(&body, "id"), field(&body, "text"));
            println!(
                "  correct: {}  ({})",
                body["analysis"]["is_correct"],
                field(&body["analysis"], "feedback")
            );
        }
        Command::Analyze { id } => {
            let body = client.analyze(&id).await?;
            println!("{}", field(&body, "analysis"));
        }
        Command::Feedback {
            id,
            is_correct,
            feedback,
        } => {
            client.feedback(&id, is_correct, &feedback).await?;
            println!("Feedback recorded for {id}");
        }
        Command::Unresolved => {
            let body = client.unresolved().await?;
            let entries = body["interactions"].as_array().cloned().unwrap_or_default();
            if entries.is_empty() {
                println!("Unresolved interactions: (none)");
            }
            for entry in entries {
                println!(
                    "  {}  {}  ->  {}",
                    field(&entry, "id"),
                    field(&entry, "prompt"),
                    field(&entry, "responder_answer")
                );
            }
        }
        Command::Ping { message } => {
            let body = client.ping(&message).await?;
            println!("{}", field(&body, "response"));
        }
        Command::Help => println!("{HELP}"),
        Command::Clear => print!("\x1B[2J\x1B[1;1H"),
        Command::Quit => {}
    }
    Ok(())
}

fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}
