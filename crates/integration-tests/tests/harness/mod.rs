#![allow(dead_code)]

pub mod config;
pub mod mock_llm;
pub mod server;

/// Decode every `data:` frame of an event-stream body
pub fn parse_frames(text: &str) -> Vec<serde_json::Value> {
    text.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("frame is JSON"))
        .collect()
}

/// Content of all non-terminal frames, concatenated
pub fn streamed_content(frames: &[serde_json::Value]) -> String {
    frames
        .iter()
        .filter(|frame| frame["done"] == false)
        .filter_map(|frame| frame["message"]["content"].as_str())
        .collect()
}
