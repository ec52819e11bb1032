//! Logging of received watch events

use kapp_watch::WatchEventType;
use serde_json::Value;
use tracing::{info, warn};

/// `namespace/name` of a resource body, or just `name` when cluster scoped
pub fn resource_ref(object: &Value) -> String {
    let name = object
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>");
    match object.pointer("/metadata/namespace").and_then(Value::as_str) {
        Some(ns) => format!("{}/{}", ns, name),
        None => name.to_string(),
    }
}

/// Log line for one event of `kind`; bookmarks produce none
pub fn event_message(kind: &str, event_type: WatchEventType, object: &Value) -> Option<String> {
    match event_type {
        WatchEventType::Error => {
            let message = object
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message");
            Some(format!("{} watch reported an error: {}", kind, message))
        }
        WatchEventType::Bookmark => None,
        _ => Some(format!("{} {} {}", event_type, kind, resource_ref(object))),
    }
}

/// Log one event for `kind`
pub fn log_event(kind: &str, event_type: WatchEventType, object: &Value) {
    let Some(message) = event_message(kind, event_type, object) else {
        return;
    };
    if event_type == WatchEventType::Error {
        warn!("{}", message);
    } else {
        info!("{}", message);
    }
}
