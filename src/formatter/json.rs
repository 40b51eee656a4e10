//! JSON text output

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::conversion::config::ConversionConfig;
use crate::error::{ConversionError, ConversionErrorKind, ConversionResult};
use crate::tree::DocumentValue;

/// Serialize any value as JSON, indented per the configuration.
///
/// Non-ASCII text is written as-is, not as `\u` escapes.
pub fn to_pretty_json<T: Serialize + ?Sized>(
    value: &T,
    config: &ConversionConfig,
) -> ConversionResult<String> {
    let result = if config.pretty {
        let indent = " ".repeat(config.indent_size as usize);
        let mut buffer = Vec::with_capacity(256);
        let mut serializer =
            Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
        value
            .serialize(&mut serializer)
            .map(|_| String::from_utf8(buffer))
    } else {
        serde_json::to_vec(value).map(String::from_utf8)
    };

    match result {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(json_failure(e.into())),
        Err(e) => Err(json_failure(e.into())),
    }
}

/// Serialize a key-value document as JSON text
pub fn format_document(doc: &DocumentValue, config: &ConversionConfig) -> ConversionResult<String> {
    to_pretty_json(&doc.to_json(), config)
}

fn json_failure(source: anyhow::Error) -> ConversionError {
    ConversionError::conversion_with_source(
        ConversionErrorKind::failed(format!("JSON serialization failed: {}", source)),
        source,
    )
}
