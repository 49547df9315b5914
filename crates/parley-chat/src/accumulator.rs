//! Reassembly of streamed tool-call fragments
//!
//! Backends split a single tool call across many deltas. The first
//! fragment usually carries the call id and function name, later ones
//! only carry pieces of the JSON arguments, sometimes without repeating
//! the id at all.

use indexmap::IndexMap;
use parley_llm::{FunctionCall, ToolCall, ToolCallDelta};

/// A tool call reassembled from one or more deltas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallRecord {
    pub call_id: String,
    pub tool_type: String,
    pub function_name: String,
    pub arguments: String,
}

impl ToolCallRecord {
    /// Both id and function name are known
    pub fn is_eligible(&self) -> bool {
        !self.call_id.is_empty() && !self.function_name.is_empty()
    }

    pub fn into_tool_call(self) -> ToolCall {
        let tool_type = if self.tool_type.is_empty() {
            "function".to_owned()
        } else {
            self.tool_type
        };

        ToolCall {
            id: self.call_id,
            tool_type,
            function: FunctionCall {
                name: self.function_name,
                arguments: self.arguments,
            },
        }
    }
}

/// Incremental fold of [`ToolCallDelta`]s for a single round
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    records: IndexMap<String, ToolCallRecord>,
    /// Ids in the order they were last identified, most recent at the end
    recency: Vec<String>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, delta: ToolCallDelta) {
        if delta.call_id.is_empty() {
            self.append_orphan(delta.arguments_fragment);
            return;
        }

        let record = self
            .records
            .entry(delta.call_id.clone())
            .or_insert_with(|| ToolCallRecord {
                call_id: delta.call_id.clone(),
                ..ToolCallRecord::default()
            });

        if !delta.tool_type.is_empty() {
            record.tool_type = delta.tool_type;
        }
        if !delta.function_name.is_empty() {
            record.function_name = delta.function_name;
        }
        record.arguments.push_str(&delta.arguments_fragment);

        self.recency.retain(|id| *id != delta.call_id);
        self.recency.push(delta.call_id);
    }

    fn append_orphan(&mut self, fragment: String) {
        if fragment.is_empty() {
            return;
        }

        let target = self
            .recency
            .iter()
            .rev()
            .find(|id| self.records.get(*id).is_some_and(ToolCallRecord::is_eligible))
            .cloned();

        match target.and_then(|id| self.records.get_mut(&id)) {
            Some(record) => record.arguments.push_str(&fragment),
            None => tracing::debug!(fragment_len = fragment.len(), "dropping tool call fragment with no owner"),
        }
    }

    /// Eligible records in first-seen order
    pub fn finish(self) -> IndexMap<String, ToolCallRecord> {
        self.records
            .into_iter()
            .filter(|(_, record)| record.is_eligible())
            .collect()
    }
}

/// Fold a complete delta sequence into eligible records
pub fn accumulate(deltas: impl IntoIterator<Item = ToolCallDelta>) -> IndexMap<String, ToolCallRecord> {
    let mut accumulator = ToolCallAccumulator::new();
    for delta in deltas {
        accumulator.push(delta);
    }
    accumulator.finish()
}
