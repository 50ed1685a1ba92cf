//! JSON-RPC reply types for the mesh side.

use serde::Deserialize;

/// JSON-RPC response from a remote agent.
///
/// Every field is optional so that shape problems can be reported as
/// protocol errors instead of parse failures.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<MeshRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct MeshRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl MeshResponse {
    /// The response id as a string, whether it was sent as a string or a number.
    pub fn id_str(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Collects reply text from a `result` object.
///
/// Looks at `parts` (a message), `status.message.parts` (a task) and
/// `artifacts[].parts`, in that order. Returns `None` when none of them
/// carries any text.
pub fn extract_text(result: &serde_json::Value) -> Option<String> {
    let mut texts = Vec::new();

    collect_parts(result.get("parts"), &mut texts);
    collect_parts(
        result.get("status").and_then(|s| s.get("message")).and_then(|m| m.get("parts")),
        &mut texts,
    );
    if let Some(artifacts) = result.get("artifacts").and_then(|a| a.as_array()) {
        for artifact in artifacts {
            collect_parts(artifact.get("parts"), &mut texts);
        }
    }

    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

fn collect_parts(parts: Option<&serde_json::Value>, out: &mut Vec<String>) {
    let Some(parts) = parts.and_then(|p| p.as_array()) else {
        return;
    };
    out.extend(
        parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .map(str::to_string),
    );
}
