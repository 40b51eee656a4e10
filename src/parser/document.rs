//! Document-form (JSON) text parsing

use crate::error::{InputFormat, ParseError, ParseResult};
use crate::tree::DocumentValue;

/// Parse JSON text into a [`DocumentValue`]
pub fn parse_document(text: &str) -> ParseResult<DocumentValue> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        ParseError::new(
            InputFormat::Document,
            format!("{} (column {})", strip_position(&e), e.column()),
        )
        .with_line(Some(e.line()))
    })?;
    Ok(DocumentValue::from_json(&value))
}

/// serde_json appends " at line X column Y"; the position is reported separately
fn strip_position(err: &serde_json::Error) -> String {
    let message = err.to_string();
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message,
    }
}
