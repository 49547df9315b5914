//! Conversion between internal types and the `OpenAI` wire format

use crate::protocol::openai::{
    OpenAiFunction, OpenAiFunctionCall, OpenAiMessage, OpenAiModelList, OpenAiRequest, OpenAiStreamChunk,
    OpenAiStreamToolCall, OpenAiTool, OpenAiToolCall,
};
use crate::types::{
    CompletionReason, CompletionRequest, Message, ModelInfo, ResponseEvent, Role, ToolCall, ToolCallDelta,
    ToolDescriptor,
};

impl From<&CompletionRequest> for OpenAiRequest {
    fn from(request: &CompletionRequest) -> Self {
        let tools = (!request.tools.is_empty()).then(|| request.tools.iter().map(Into::into).collect());

        Self {
            model: request.model.clone(),
            messages: request.messages.iter().map(Into::into).collect(),
            stream: true,
            tools,
        }
    }
}

impl From<&Message> for OpenAiMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        Self {
            role: role.to_owned(),
            content: message.content.clone(),
            tool_calls: message
                .tool_calls
                .as_ref()
                .map(|calls| calls.iter().map(Into::into).collect()),
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

impl From<&ToolCall> for OpenAiToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            tool_type: call.tool_type.clone(),
            function: OpenAiFunctionCall {
                name: call.function.name.clone(),
                arguments: call.function.arguments.clone(),
            },
        }
    }
}

impl From<&ToolDescriptor> for OpenAiTool {
    fn from(tool: &ToolDescriptor) -> Self {
        Self {
            tool_type: "function".to_owned(),
            function: OpenAiFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        }
    }
}

impl From<OpenAiModelList> for Vec<ModelInfo> {
    fn from(list: OpenAiModelList) -> Self {
        list.data
            .into_iter()
            .map(|model| ModelInfo {
                digest: model.id.clone(),
                name: model.id,
            })
            .collect()
    }
}

/// Split one stream frame into normalized events
///
/// Content comes first, then each tool call fragment, then the
/// completion when the frame carries a finish reason.
pub fn chunk_to_events(chunk: OpenAiStreamChunk) -> Vec<ResponseEvent> {
    let mut events = Vec::new();

    for choice in chunk.choices {
        if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
            events.push(ResponseEvent::ContentDelta(content));
        }

        events.extend(
            choice
                .delta
                .tool_calls
                .into_iter()
                .flatten()
                .map(|call| ResponseEvent::ToolCallDelta(tool_call_delta(call))),
        );

        if let Some(reason) = choice.finish_reason.as_deref() {
            events.push(ResponseEvent::Completion(parse_finish_reason(reason)));
        }
    }

    events
}

fn tool_call_delta(call: OpenAiStreamToolCall) -> ToolCallDelta {
    let (function_name, arguments_fragment) = call
        .function
        .map(|f| (f.name.unwrap_or_default(), f.arguments.unwrap_or_default()))
        .unwrap_or_default();

    ToolCallDelta {
        call_id: call.id.unwrap_or_default(),
        tool_type: call.tool_type.unwrap_or_default(),
        function_name,
        arguments_fragment,
    }
}

/// Map a backend finish reason onto [`CompletionReason`]
///
/// Reasons this gateway has no branch for (`content_filter` and the like)
/// end the conversation like `stop`.
pub fn parse_finish_reason(reason: &str) -> CompletionReason {
    match reason {
        "" => CompletionReason::None,
        "tool_calls" | "function_call" => CompletionReason::ToolCalls,
        "length" => CompletionReason::Length,
        _ => CompletionReason::Stop,
    }
}
