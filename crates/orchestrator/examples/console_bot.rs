//! Interactive console bot example.
//!
//! Reads lines from stdin, routes each one through the orchestrator, and
//! prints the tagged reply. No skills are wired up, so skill-backed
//! routes (weather, email, media) stay dormant and everything else goes
//! to the two backends.
//!
//! Run with: cargo run -p orchestrator --example console_bot
//!
//! Configuration via .env file or environment variables:
//!   CLAUDE_ACCESS_TOKEN      - Claude OAuth access token
//!   CLAUDE_REFRESH_TOKEN     - Claude OAuth refresh token
//!   CLAUDE_CLIENT_ID         - OAuth client id, needed for token refresh
//!   GEMINI_API_KEY           - Gemini API key
//!   GEMINI_API_KEY_SECONDARY - Fallback key for throttled requests
//!   JUNIPER_SYSTEM_PROMPT / JUNIPER_PROMPT_FILE - optional system prompt

use std::io::{self, BufRead, Write};

use orchestrator::{Orchestrator, RouteReply, SkillSet};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("orchestrator=debug".parse().unwrap())
                .add_directive("claude_brain=info".parse().unwrap())
                .add_directive("gemini_brain=info".parse().unwrap()),
        )
        .init();

    println!("Initializing orchestrator...");
    let orchestrator = Orchestrator::from_env(SkillSet::new())?;
    println!("Ready. Type a message, or \"quit\" to exit.");
    println!("Try:");
    println!("  - \"hello\" - simple chat");
    println!("  - \"write a short blog post about rust\" - compose route");
    println!("  - \"/claude what is ownership?\" - force the deep backend");
    println!();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        let routed = orchestrator.handle("console", line).await;
        match &routed.reply {
            RouteReply::Text(text) => println!("[{}] {}\n", routed.tag, text),
            RouteReply::Media(payload) => {
                let status = if payload.success { "ok" } else { "failed" };
                let chars = payload
                    .image_base64
                    .as_ref()
                    .map(|data| data.len())
                    .unwrap_or(0);
                let note = payload
                    .message
                    .as_ref()
                    .map(|m| format!(": {}", m))
                    .unwrap_or_default();
                println!("[{}] media {} ({} base64 chars){}\n", routed.tag, status, chars, note);
            }
        }
    }

    println!("Bye!");
    Ok(())
}
