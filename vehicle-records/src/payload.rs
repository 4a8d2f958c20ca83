use crate::fields::{RESULTS_KEYS, scalar_text};
use serde_json::{Map, Value};

/// Key a provider sets instead of failing the call.
pub const ERROR_MARKER: &str = "error";

/// One raw provider response, classified once at the boundary.
///
/// The provider reports failure by returning a body that carries an
/// `"error"` field. That shape is turned into [`ProviderPayload::Failed`]
/// here, so nothing downstream has to sniff for it.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    Records(Value),
    Failed { reason: String, raw: Value },
}

impl ProviderPayload {
    pub fn from_value(raw: Value) -> Self {
        let reason = raw
            .as_object()
            .and_then(|map| map.get(ERROR_MARKER))
            .filter(|marker| crate::fields::truthy(marker))
            .map(|marker| scalar_text(marker).unwrap_or_else(|| marker.to_string()));

        match reason {
            Some(reason) => ProviderPayload::Failed { reason, raw },
            None => ProviderPayload::Records(raw),
        }
    }

    /// Failure-marked body, in the shape the provider itself produces.
    pub fn failure(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let raw = serde_json::json!({
            "Count": 0,
            "Message": "lookup failed",
            "Results": [],
            ERROR_MARKER: reason,
        });
        ProviderPayload::Failed { reason, raw }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProviderPayload::Failed { .. })
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            ProviderPayload::Failed { reason, .. } => Some(reason),
            ProviderPayload::Records(_) => None,
        }
    }

    /// The body exactly as received, for caching.
    pub fn raw(&self) -> &Value {
        match self {
            ProviderPayload::Records(raw) => raw,
            ProviderPayload::Failed { raw, .. } => raw,
        }
    }

    /// Object entries of the results list; empty for failed payloads or
    /// unrecognized shapes.
    pub fn records(&self) -> impl Iterator<Item = &Map<String, Value>> {
        let items = match self {
            ProviderPayload::Records(raw) => results_list(raw),
            ProviderPayload::Failed { .. } => None,
        };
        items
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    pub fn record_count(&self) -> usize {
        self.records().count()
    }
}

/// The results list under the first casing that holds a non-empty value.
fn results_list(raw: &Value) -> Option<&Vec<Value>> {
    let map = raw.as_object()?;
    RESULTS_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|value| crate::fields::truthy(value))
        .and_then(Value::as_array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_records_under_either_casing() {
        let lower = ProviderPayload::from_value(json!({"results": [{"a": 1}, {"a": 2}]}));
        let upper = ProviderPayload::from_value(json!({"Results": [{"a": 1}]}));
        assert_eq!(lower.record_count(), 2);
        assert_eq!(upper.record_count(), 1);
    }

    #[test]
    fn test_empty_lower_falls_through_to_upper() {
        let payload = ProviderPayload::from_value(json!({"results": [], "Results": [{"a": 1}]}));
        assert_eq!(payload.record_count(), 1);
    }

    #[test]
    fn test_non_list_and_non_object_entries() {
        let scalar = ProviderPayload::from_value(json!({"results": "nope"}));
        assert_eq!(scalar.record_count(), 0);

        let mixed = ProviderPayload::from_value(json!({"results": [1, "x", null, {"ok": true}]}));
        assert_eq!(mixed.record_count(), 1);

        let not_object = ProviderPayload::from_value(json!([{"a": 1}]));
        assert_eq!(not_object.record_count(), 0);
    }

    #[test]
    fn test_error_marker_becomes_failure() {
        let payload = ProviderPayload::from_value(json!({
            "Count": 0,
            "Results": [{"odiNumber": "1"}],
            "error": "502 Bad Gateway",
        }));
        assert!(payload.is_failed());
        assert_eq!(payload.failure_reason(), Some("502 Bad Gateway"));
        assert_eq!(payload.record_count(), 0);
    }

    #[test]
    fn test_null_error_marker_is_not_failure() {
        let payload = ProviderPayload::from_value(json!({"error": null, "results": []}));
        assert!(!payload.is_failed());
    }

    #[test]
    fn test_failure_constructor_round_trips() {
        let payload = ProviderPayload::failure("file missing");
        let again = ProviderPayload::from_value(payload.raw().clone());
        assert_eq!(again.failure_reason(), Some("file missing"));
    }
}
