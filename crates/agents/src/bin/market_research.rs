use agent_core::Config;
use agents::AgentRunner;
use anyhow::Result;
use llm::{GeminiClient, GeminiConfig};
use std::time::Duration;
use tooling::{ReadWebpageTool, SaveReportTool, ToolRegistry, WebSearchTool};
use tracing::info;

const SYSTEM_INSTRUCTION: &str = "\
You are a world-class market research analyst AI. Your goal is to execute a user's request by breaking it down into a step-by-step plan.
You must use the tools provided to gather information. Do not answer from your own knowledge.
For each step, think about what you need to do, choose the best tool, and execute it.
Observe the results from the tool and then think about the next step.
When gathering information about multiple items (like competitors), analyze one at a time.
Use the save_report tool to save your intermediate findings for each competitor.
Once you have gathered all the necessary information, synthesize it into a final, well-structured report that directly answers the user's original request.
Do not simply output the raw data from the tools.";

const DEFAULT_GOAL: &str = "\
Please act as a market research analyst.
Our company is launching a new productivity app called 'FocusFlow'.
Your task is to generate a competitive analysis report.

The report must:
1. Identify 2-3 of the main competitors in the productivity/note-taking space.
2. For each competitor, find and summarize:
   - Their key features.
   - Their pricing model (e.g., free tier, subscription costs).
   - Common user complaints (search for reviews or Reddit comments).
3. Conclude with a strategic recommendation for FocusFlow based on your findings.";

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
    registry.register(Box::new(WebSearchTool::new(Duration::from_secs(
        config.agent.search_delay_secs,
    ))?))?;
    registry.register(Box::new(ReadWebpageTool::new(Duration::from_secs(
        config.agent.fetch_delay_secs,
    ))?))?;
    registry.register(Box::new(SaveReportTool::new(&config.agent.report_dir)))?;

    let runner = AgentRunner::new(client, registry, SYSTEM_INSTRUCTION, config.agent.max_steps);

    let goal = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_GOAL.to_string());
    info!("running market research agent");
    println!("User Goal: {}\n{}", goal, "-".repeat(20));

    let report = runner.run(&goal).await?;

    println!("\n{}\n--- Final Report ---", "-".repeat(20));
    println!("{}", report);

    Ok(())
}
