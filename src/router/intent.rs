//! Intent keys.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag naming a registered response handler.
///
/// The built-in keys are constants; new ones come from config or from
/// registering additional handlers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentKey(Cow<'static, str>);

impl IntentKey {
    pub const WEATHER: IntentKey = IntentKey(Cow::Borrowed("weather"));
    pub const TRANSLATION: IntentKey = IntentKey(Cow::Borrowed("translation"));
    pub const MODEL: IntentKey = IntentKey(Cow::Borrowed("model"));

    pub fn new(key: impl Into<String>) -> Self {
        Self(Cow::Owned(key.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IntentKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_and_borrowed_compare_equal() {
        assert_eq!(IntentKey::new("weather"), IntentKey::WEATHER);
        assert_eq!(IntentKey::from("model"), IntentKey::MODEL);
        assert_ne!(IntentKey::TRANSLATION, IntentKey::MODEL);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&IntentKey::TRANSLATION).unwrap();
        assert_eq!(json, "\"translation\"");
        assert_eq!(IntentKey::WEATHER.to_string(), "weather");
    }
}
