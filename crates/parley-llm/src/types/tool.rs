use serde::Serialize;

/// Function the model may call, as advertised for one round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema of the argument object
    pub parameters: serde_json::Value,
}
