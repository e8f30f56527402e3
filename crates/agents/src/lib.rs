use anyhow::{Context as _, Result};
use llm::{Content, FunctionDeclaration, FunctionResponse, GeminiClient, ToolSpec};
use serde_json::json;
use tooling::{ToolInput, ToolRegistry};
use tracing::{debug, info};

/// Drives a model through repeated generate-call-observe rounds until
/// it produces a plain text answer or the step budget runs out.
pub struct AgentRunner {
    client: GeminiClient,
    registry: ToolRegistry,
    system_instruction: String,
    max_steps: usize,
}

impl AgentRunner {
    pub fn new(
        client: GeminiClient,
        registry: ToolRegistry,
        system_instruction: impl Into<String>,
        max_steps: usize,
    ) -> Self {
        Self {
            client,
            registry,
            system_instruction: system_instruction.into(),
            max_steps,
        }
    }

    pub async fn run(&self, goal: &str) -> Result<String> {
        let tools = self.tool_specs()?;
        let mut contents = vec![Content::user(goal)];

        for step in 0..self.max_steps {
            let reply = self
                .client
                .generate(
                    contents.clone(),
                    Some(self.system_instruction.clone()),
                    Some(tools.clone()),
                )
                .await?;

            let calls: Vec<_> = reply.function_calls().into_iter().cloned().collect();
            contents.push(reply.clone());

            if calls.is_empty() {
                info!(step, "agent finished");
                return Ok(reply.text());
            }

            let mut responses = Vec::with_capacity(calls.len());
            for call in calls {
                debug!(step, tool = %call.name, "executing tool call");
                let input = ToolInput::from_call(&call.name, &call.args);
                // Tool failures are reported back to the model so it
                // can adjust its plan instead of aborting the run.
                let response = match self.registry.execute_tool(input).await {
                    Ok(output) => output.result,
                    Err(e) => json!({"error": e.to_string()}),
                };
                responses.push(FunctionResponse {
                    name: call.name,
                    response,
                });
            }
            contents.push(Content::function_responses(responses));
        }

        anyhow::bail!(
            "Agent did not produce a final answer within {} steps",
            self.max_steps
        )
    }

    fn tool_specs(&self) -> Result<Vec<ToolSpec>> {
        let function_declarations = self
            .registry
            .get_all_schemas()
            .into_iter()
            .map(|schema| {
                serde_json::from_value::<FunctionDeclaration>(schema)
                    .context("Invalid tool schema")
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(vec![ToolSpec {
            function_declarations,
        }])
    }
}
