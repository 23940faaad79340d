use anyhow::Result;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::Value;

use crate::errors::AgentResult;
use crate::models::content::{contents_to_text, Content};
use crate::models::message::{Message, ToolRequest};
use crate::providers::base::{Provider, Usage};
use crate::tools::ToolSet;

/// Most model calls a single reply may make
pub const MAX_STEPS: usize = 50;

/// One tool call made during a step and what it returned
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    pub output: String,
    pub is_error: bool,
}

impl ToolInvocation {
    fn new(request: &ToolRequest, result: &AgentResult<Vec<Content>>) -> Self {
        let (name, arguments) = match &request.tool_call {
            Ok(call) => (call.name.clone(), call.arguments.clone()),
            Err(_) => (String::new(), Value::Null),
        };
        let (output, is_error) = match result {
            Ok(contents) => (contents_to_text(contents), false),
            Err(e) => (e.to_string(), true),
        };
        Self {
            id: request.id.clone(),
            name,
            arguments,
            output,
            is_error,
        }
    }
}

/// A model call plus the tool calls it asked for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub number: usize,
    pub text: String,
    pub tool_invocations: Vec<ToolInvocation>,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Text from the model, emitted as soon as its step returns
    Text(String),
    /// A finished step, after its tools ran
    Step(Step),
}

/// Agent drives a model through repeated tool use with a fixed tool set
pub struct Agent {
    provider: Box<dyn Provider>,
    tools: ToolSet,
    max_steps: usize,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, tools: ToolSet) -> Self {
        Self {
            provider,
            tools,
            max_steps: MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    async fn dispatch_tool_call(&self, request: &ToolRequest) -> AgentResult<Vec<Content>> {
        let call = request.tool_call.as_ref().map_err(Clone::clone)?;
        self.tools.call(call).await
    }

    /// Create a stream of the model's text and each completed step.
    ///
    /// The stream ends when the model answers without tool calls or after `max_steps`
    /// model calls. Tool failures are handed back to the model, only provider errors
    /// end the stream with an error.
    pub fn reply<'a>(
        &'a self,
        system: &'a str,
        messages: &[Message],
    ) -> BoxStream<'a, Result<AgentEvent>> {
        let mut messages = messages.to_vec();

        Box::pin(async_stream::try_stream! {
            let mut number = 0;
            loop {
                number += 1;

                let (response, usage) = self.provider.complete(
                    system,
                    &messages,
                    self.tools.tools(),
                ).await?;

                let text = response.text();
                if !text.is_empty() {
                    yield AgentEvent::Text(text.clone());
                }

                // Make sure the text above reaches the consumer before the tools run
                tokio::task::yield_now().await;

                let requests: Vec<ToolRequest> = response
                    .tool_requests()
                    .into_iter()
                    .cloned()
                    .collect();

                // Tools run one at a time, later calls may depend on earlier ones
                let mut tool_invocations = Vec::with_capacity(requests.len());
                let mut message_tool_response = Message::user();
                for request in &requests {
                    let output = self.dispatch_tool_call(request).await;
                    tool_invocations.push(ToolInvocation::new(request, &output));
                    message_tool_response =
                        message_tool_response.with_tool_response(request.id.clone(), output);
                }

                let done = !response.has_tool_requests();
                messages.push(response);
                if !done {
                    messages.push(message_tool_response);
                }

                tracing::info!(
                    step = number,
                    tool_calls = tool_invocations.len(),
                    input_tokens = ?usage.input_tokens,
                    output_tokens = ?usage.output_tokens,
                    "Step finished"
                );

                yield AgentEvent::Step(Step {
                    number,
                    text,
                    tool_invocations,
                    usage,
                });

                if done {
                    break;
                }
                if number >= self.max_steps {
                    tracing::warn!(max_steps = self.max_steps, "Step limit reached, stopping");
                    break;
                }
            }
        })
    }
}

/// The outcome of a reply stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Text of the last step
    pub text: String,
    /// Usage summed over all steps
    pub usage: Usage,
    pub steps: Vec<Step>,
}

impl RunSummary {
    pub fn record(&mut self, event: &AgentEvent) {
        if let AgentEvent::Step(step) = event {
            self.text = step.text.clone();
            self.usage.accumulate(&step.usage);
            self.steps.push(step.clone());
        }
    }

    /// The loop stopped at the step limit rather than on a final answer
    pub fn truncated(&self) -> bool {
        self.steps
            .last()
            .is_some_and(|step| !step.tool_invocations.is_empty())
    }

    /// Drain a reply stream
    pub async fn collect(mut stream: BoxStream<'_, Result<AgentEvent>>) -> Result<Self> {
        let mut summary = Self::default();
        while let Some(event) = stream.try_next().await? {
            summary.record(&event);
        }
        Ok(summary)
    }
}
