use serde_json::Value;

/// Order and presence of the keys a JSON object was read with.
///
/// Empty for values built in code, which then serialize every known key in
/// schema order.
#[derive(Clone, Debug, Default)]
pub struct KeyLayout(Option<Vec<String>>);

impl KeyLayout {
    pub(crate) fn read<'a>(keys: impl IntoIterator<Item = &'a String>) -> Self {
        Self(Some(keys.into_iter().cloned().collect()))
    }

    pub fn is_recorded(&self) -> bool {
        self.0.is_some()
    }

    pub fn keys(&self) -> &[String] {
        self.0.as_deref().unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys().iter().any(|seen| seen == key)
    }
}

/// Reads a string field the way a lenient decoder does: `null` leaves the
/// default in place, any other non-string is rejected.
pub(crate) fn string_or_default(key: &str, value: Value) -> Result<Option<String>, String> {
    match value {
        Value::String(text) => Ok(Some(text)),
        Value::Null => Ok(None),
        other => Err(format!(
            "invalid type for '{key}': expected a string or null, found {other}"
        )),
    }
}
