//! Step Agent - interactive console driver
//!
//! Reads one query per line from stdin and runs it as a turn, printing
//! steps as they arrive. Ctrl-C cancels the running turn; Ctrl-D exits.

use step_agent::agent::{Agent, AgentError, AgentEvent, Step, TurnOptions};
use step_agent::config::Config;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "step_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, max_steps={:?}",
        config.model, config.max_steps
    );

    let agent = Agent::from_config(config);
    let mut transcript = agent.new_transcript();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all("👉 ".as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        let cancel = CancellationToken::new();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let options = TurnOptions::default()
            .with_cancel(cancel.clone())
            .with_events(events_tx);

        let turn = agent.run_turn_with(transcript.clone(), query, &options);
        tokio::pin!(turn);

        let result = loop {
            tokio::select! {
                result = &mut turn => break result,
                Some(event) = events_rx.recv() => print_event(&event),
                _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                    info!("Cancelling turn after the current step");
                    cancel.cancel();
                }
            }
        };
        while let Ok(event) = events_rx.try_recv() {
            print_event(&event);
        }

        transcript = match result {
            Ok(outcome) => outcome.transcript,
            Err(err) => {
                match &err.error {
                    AgentError::Cancelled => println!("⏹️  Cancelled"),
                    other => println!("❌ {}", other),
                }
                err.transcript
            }
        };
        println!("\n");
    }

    Ok(())
}

fn print_event(event: &AgentEvent) {
    match event {
        AgentEvent::Step { step, .. } => match step {
            Step::Start { content } => println!("🔥 {}", content.as_deref().unwrap_or("")),
            Step::Plan { content } => println!("🧠 {}", content),
            Step::Tool { name, input } => println!("🔨: {} ({})", name, input),
            Step::Output { content } => println!("🎂 {}", content),
        },
        AgentEvent::ToolResult { observation, .. } => println!(
            "🔨: {} ({}) = {}",
            observation.tool, observation.input, observation.output
        ),
    }
}
