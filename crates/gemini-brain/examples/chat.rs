//! Simple test for GeminiBrain chat.
//!
//! Run with: cargo run -p gemini-brain --example chat
//! Or with a custom message: cargo run -p gemini-brain --example chat -- "Your message here"
//!
//! Make sure to set environment variables in .env:
//!   GEMINI_API_KEY - Gemini API key

use gemini_brain::{Brain, ChatRequest, GeminiBrain};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Get message from command line args or use default
    let args: Vec<String> = env::args().collect();
    let message = if args.len() > 1 {
        args[1..].join(" ")
    } else {
        "Hello! Please respond with a short greeting.".to_string()
    };

    println!("Initializing GeminiBrain...");
    let brain = GeminiBrain::from_env()?;

    println!("Brain initialized: {}", brain.name());
    println!("API URL: {}", brain.config().api_url);
    println!("Model: {}", brain.config().model);
    println!(
        "Secondary key configured: {}",
        brain.config().secondary_api_key.is_some()
    );
    println!();

    println!("Sending: \"{}\"", message);
    println!("Waiting for response...\n");

    let reply = brain.chat(ChatRequest::from_user(message)).await?;

    println!("=== Response ===");
    println!("{}", reply);
    println!("================");

    Ok(())
}
