//! Send a single message through ClaudeBrain.
//!
//! Usage:
//!   CLAUDE_ACCESS_TOKEN=... cargo run --example chat -- "your message"

use claude_brain::{Brain, ChatRequest, ClaudeBrain};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let message = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let message = if message.is_empty() {
        "Hello! What can you help me with?".to_string()
    } else {
        message
    };

    let brain = ClaudeBrain::from_env()?;
    let config = brain.config();

    println!("Model:   {}", config.model);
    println!("API URL: {}", config.api_url);
    println!("Message: {}", message);
    println!();

    let response = brain.chat(ChatRequest::from_user(message)).await?;

    println!("=== Response ===");
    println!("{}", response);

    Ok(())
}
