//! Generic single-field envelope for primitive values.

use serde::{Deserialize, Serialize};

/// A minimal wrapper giving a primitive value a structured wire shape.
///
/// Tools and prompts whose natural input is a bare string or number wrap
/// it in an `Envelope` so the parameter bytes are always a JSON object
/// with a single `data` field.
///
/// # Example
///
/// ```
/// use ctxkit_core::Envelope;
///
/// let json = serde_json::to_string(&Envelope::<String>::new("hi")).unwrap();
/// assert_eq!(json, r#"{"data":"hi"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The boxed value.
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap a value.
    pub fn new(data: impl Into<T>) -> Self {
        Self { data: data.into() }
    }

    /// Unwrap the value.
    pub fn into_inner(self) -> T {
        self.data
    }
}
