use agent_core::Config;
use agents::AgentRunner;
use anyhow::Result;
use llm::{GeminiClient, GeminiConfig};
use std::io::{self, BufRead, Write};
use tooling::{SaveReportTool, ToolRegistry, WeatherTool};

const SYSTEM_INSTRUCTION: &str = "\
You are a real-time Weather Alert & Recommendation Agent.
1. Use get_weather to fetch current weather for the user's city.
2. Summarize the weather and flag any severe conditions (e.g., heavy rain, storms, extreme heat).
3. Give actionable recommendations (e.g., carry umbrella, avoid outdoor activity, health tips).
4. Save the report using save_report.";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load_from_env().unwrap_or_default();
    let llm_config = config.llm.with_env_overrides();

    let client = GeminiClient::new(GeminiConfig {
        model: llm_config.model,
        base_url: llm_config.base_url,
        temperature: llm_config.temperature,
        ..GeminiConfig::from_env()?
    })?;

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WeatherTool::new()?))?;
    registry.register(Box::new(SaveReportTool::new(&config.agent.report_dir)))?;

    let runner = AgentRunner::new(client, registry, SYSTEM_INSTRUCTION, config.agent.max_steps);

    println!("--- Real-Time Weather Alert & Recommendation Agent ---");

    let city = match std::env::args().nth(1) {
        Some(city) => city,
        None => {
            print!("Enter your city name: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    if city.is_empty() {
        anyhow::bail!("No city name given");
    }

    let goal = format!("Give me the current weather and recommendations for {}.", city);
    let report = runner.run(&goal).await?;

    println!("\n--- Weather Report & Recommendations ---\n");
    println!("{}", report);

    Ok(())
}
