use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::analyzer::AnalysisResult;
use crate::errors::ClipError;

// Greedy on purpose: first `{` through last `}`.
static EMBEDDED_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Parse the model's reply into an [`AnalysisResult`].
///
/// The whole reply is tried as JSON first. If that fails to parse or to
/// validate, the span from the first `{` to the last `}` gets one more try.
pub fn parse_analysis(reply: &str) -> Result<AnalysisResult, ClipError> {
    if let Ok(result) = parse_object(reply.trim()) {
        return Ok(result);
    }

    let Some(embedded) = EMBEDDED_OBJECT.find(reply) else {
        return Err(ClipError::MalformedResponse(
            "no JSON object found in the reply".to_string(),
        ));
    };
    parse_object(embedded.as_str()).map_err(ClipError::MalformedResponse)
}

fn parse_object(text: &str) -> Result<AnalysisResult, String> {
    let value: Value = serde_json::from_str(text).map_err(|e| format!("invalid JSON: {e}"))?;
    validate(value)
}

fn validate(value: Value) -> Result<AnalysisResult, String> {
    let Value::Object(mut map) = value else {
        return Err("reply is not a JSON object".to_string());
    };

    let title = non_empty_string(map.remove("title"), "title")?;
    let description = non_empty_string(map.remove("description"), "description")?;
    let tags = match map.remove("tags") {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(tag) => Ok(tag),
                // scalars keep their JSON text, e.g. `2024` or `true`
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                other => Err(format!("tag {other} is not a scalar")),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err("'tags' is not an array".to_string()),
        None => return Err("missing 'tags'".to_string()),
    };

    Ok(AnalysisResult {
        title,
        description,
        tags,
    })
}

fn non_empty_string(value: Option<Value>, field: &str) -> Result<String, String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) => Err(format!("'{field}' is empty")),
        Some(_) => Err(format!("'{field}' is not a string")),
        None => Err(format!("missing '{field}'")),
    }
}
