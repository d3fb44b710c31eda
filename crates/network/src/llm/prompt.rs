use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use std::fmt::Write;

use crate::agent::Agent;
use crate::context::RuntimeContext;
use crate::message::{ChatMessage, Role};

/// Compose the routing model's system prompt
pub fn system_prompt(instructions: &str, agents: &[Agent], context: &RuntimeContext) -> String {
    let mut prompt = String::new();

    if !instructions.trim().is_empty() {
        prompt.push_str(instructions.trim());
        prompt.push_str("\n\n");
    }

    prompt.push_str(
        "You route each request to the most suitable agent below and answer in that agent's role.\n\n## Agents\n",
    );
    for agent in agents {
        let _ = write!(prompt, "- {} ({})", agent.name(), agent.model());
        if !agent.instructions().trim().is_empty() {
            let _ = write!(prompt, ": {}", agent.instructions().trim());
        }
        prompt.push('\n');
    }

    if !context.is_empty() {
        prompt.push_str("\n## Runtime context\n");
        prompt.push_str(&serde_json::Value::Object(context.as_map().clone()).to_string());
        prompt.push('\n');
    }

    prompt
}

/// Convert normalized messages into provider request messages
pub fn build_messages(
    system: &str,
    messages: &[ChatMessage],
) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
    let mut request = Vec::with_capacity(messages.len() + 1);
    request.push(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()?
            .into(),
    );

    for message in messages {
        let converted: ChatCompletionRequestMessage = match message.role {
            Role::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.as_str())
                .build()?
                .into(),
            Role::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.as_str())
                .build()?
                .into(),
            Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.as_str())
                .build()?
                .into(),
            // Tool results arrive without a call id, so relay them as user turns
            Role::Tool => ChatCompletionRequestUserMessageArgs::default()
                .content(format!("Tool output:\n{}", message.content))
                .build()?
                .into(),
        };
        request.push(converted);
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_common::ModelDescriptor;

    fn agents() -> Vec<Agent> {
        vec![
            Agent::new("searcher", "Find sources.", ModelDescriptor::new("local", "llama3.1:8b")),
            Agent::new("writer", "", ModelDescriptor::new("openai", "gpt-4o")),
        ]
    }

    #[test]
    fn test_system_prompt_lists_agents() {
        let prompt = system_prompt("Be precise.", &agents(), &RuntimeContext::new());
        assert!(prompt.starts_with("Be precise.\n\n"));
        assert!(prompt.contains("- searcher (local/llama3.1:8b): Find sources.\n"));
        assert!(prompt.contains("- writer (openai/gpt-4o)\n"));
        assert!(!prompt.contains("Runtime context"));
    }

    #[test]
    fn test_system_prompt_includes_context() {
        let mut context = RuntimeContext::new();
        context.set("tenant", "acme");
        let prompt = system_prompt("", &agents(), &context);
        assert!(prompt.contains("## Runtime context\n{\"tenant\":\"acme\"}"));
    }

    #[test]
    fn test_build_messages_prepends_system() {
        let messages = build_messages(
            "sys",
            &[ChatMessage::user("hi"), ChatMessage::new(Role::Tool, "42")],
        )
        .unwrap();
        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[2], ChatCompletionRequestMessage::User(_)));
    }
}
