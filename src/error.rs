use wasm_bindgen::JsValue;

#[derive(Debug, thiserror::Error)]
pub enum PickerError {
    #[error("element #{0} not found")]
    MissingElement(String),

    #[error("element #{id} is not {expected}")]
    WrongElement { id: String, expected: &'static str },

    #[error("invalid picker configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unknown log level: {0}")]
    LogLevel(String),

    #[error("failed to read {name}: {reason}")]
    Read { name: String, reason: String },

    #[error("picker is busy handling another event")]
    Busy,

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    Js(String),
}

impl From<JsValue> for PickerError {
    fn from(value: JsValue) -> Self {
        Self::Js(format!("{value:?}"))
    }
}

impl From<PickerError> for JsValue {
    fn from(error: PickerError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}
