use serde_json::Value;

/// Events crossing from the document feed to the UI thread.
#[derive(Debug, Clone)]
pub enum AppEvent {
    DocumentLoaded(Value),
    FeedError(String),
}
