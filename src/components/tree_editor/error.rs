use thiserror::Error;

pub type Result<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
	#[error("Import failed, the file is not a valid decision tree document: {0}")]
	Parse(#[source] serde_json::Error),

	#[error("Export failed: {0}")]
	Serialize(#[source] serde_json::Error),

	#[error("The selected file could not be read as text")]
	EmptyFile,

	#[error("Browser call failed: {0}")]
	Browser(String),
}

impl From<wasm_bindgen::JsValue> for EditorError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		EditorError::Browser(
			value
				.as_string()
				.unwrap_or_else(|| format!("{value:?}")),
		)
	}
}
