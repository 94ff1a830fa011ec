//! `cvagent ask`: interactive or single-question chat.

use cvagent_agent::RoutingAgent;
use cvagent_config::AppConfig;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub async fn run(message: Option<String>, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GROQ_API_KEY=gsk_...      (default provider)");
        eprintln!("    OPENAI_API_KEY=sk-...     (for OpenAI)");
        eprintln!("    CVAGENT_API_KEY=...       (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let mut agent = build_agent(&config)?;

    if let Some(question) = message {
        eprint!("  Thinking...");
        let result = agent.run_detailed(&question).await;
        eprint!("\r              \r");
        let result = result?;
        if verbose {
            eprintln!("  Consulted: {}", result.context_subjects.join(", "));
        }
        println!("{}", result.answer);
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║          cvagent: Interactive Mode           ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!(
        "  Subjects:  {}",
        agent
            .resolver()
            .subjects()
            .map(|s| s.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Memory:    last {} turns", agent.history().window());
    println!();
    println!("  Type your question and press Enter.");
    println!("  /reset clears the conversation, /history shows it.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "exit" | "quit" => break,
            "/reset" => {
                agent.reset();
                println!("  Conversation cleared.");
                println!();
            }
            "/history" => print_history(&agent),
            _ => {
                eprint!("  ...");
                match agent.run_detailed(input).await {
                    Ok(result) => {
                        eprint!("\r     \r");
                        debug!(namespaces = ?result.namespaces, "Turn complete");
                        println!();
                        if verbose {
                            println!("  [{}]", result.context_subjects.join(", "));
                        }
                        for line in result.answer.lines() {
                            println!("  Assistant > {line}");
                        }
                        println!();
                    }
                    Err(e) => {
                        eprint!("\r     \r");
                        eprintln!("  [Error] {e}");
                        println!();
                    }
                }
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

/// Wire the provider, index and capabilities described by `config` into an agent.
pub fn build_agent(config: &AppConfig) -> Result<RoutingAgent, Box<dyn std::error::Error>> {
    let router = cvagent_providers::build_from_config(config);
    let provider = router.default().ok_or("No default provider configured")?;
    let embedder = router.embedding().ok_or("No embedding provider configured")?;

    let index = cvagent_tools::index_from_config(config);
    let capabilities = cvagent_tools::registry_from_config(config, embedder, index)?;

    Ok(RoutingAgent::from_config(config, provider, capabilities)?)
}

fn print_history(agent: &RoutingAgent) {
    let history = agent.history();
    if history.is_empty() {
        println!("  (no turns yet)");
        println!();
        return;
    }
    for (i, turn) in history.recent().enumerate() {
        println!("  {}. You > {}", i + 1, turn.human_input);
        for line in turn.agent_output.lines() {
            println!("     Assistant > {line}");
        }
    }
    println!();
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
