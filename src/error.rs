//! Error types for viewer construction and DOM binding.

/// All errors the viewer can report.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpinError {
    /// The container holds no frame elements.
    #[error("No frames found in container")]
    NoFrames,

    /// The container size along the active axis is not usable for frame stepping.
    #[error("Invalid container size: {width}x{height}")]
    InvalidSize { width: f64, height: f64 },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text could not be deserialized.
    #[error("Configuration parse error: {0}")]
    Config(String),

    /// No element with the given id exists in the document.
    #[error("Element not found: #{0}")]
    ElementNotFound(String),

    /// Running outside a browser window.
    #[error("No window available")]
    NoWindow,

    /// A DOM call failed.
    #[error("DOM error: {0}")]
    Dom(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpinError>;

#[cfg(feature = "toml")]
impl From<toml::de::Error> for SpinError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(feature = "web")]
impl From<SpinError> for wasm_bindgen::JsValue {
    fn from(e: SpinError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(feature = "web")]
impl From<wasm_bindgen::JsValue> for SpinError {
    fn from(v: wasm_bindgen::JsValue) -> Self {
        Self::Dom(v.as_string().unwrap_or_else(|| format!("{:?}", v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(SpinError::NoFrames.to_string(), "No frames found in container");
        assert_eq!(
            SpinError::InvalidSize { width: 0.0, height: 300.0 }.to_string(),
            "Invalid container size: 0x300"
        );
        assert_eq!(
            SpinError::ElementNotFound("bike".into()).to_string(),
            "Element not found: #bike"
        );
    }
}
