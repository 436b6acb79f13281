use serde::Deserialize;
use holostay_core::payment::CorrelationMetadata;

pub const SESSION_COMPLETED: &str = "checkout.session.completed";
pub const SESSION_EXPIRED: &str = "checkout.session.expired";

/// The event kinds this service reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    SessionCompleted,
    SessionExpired,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        match value {
            SESSION_COMPLETED => EventKind::SessionCompleted,
            SESSION_EXPIRED => EventKind::SessionExpired,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// Webhook event envelope delivered by the payment provider
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// The checkout session carried by `checkout.session.*` events
#[derive(Debug, Clone, Deserialize)]
pub struct SessionObject {
    pub id: String,
    #[serde(default)]
    pub metadata: Option<CorrelationMetadata>,
    #[serde(default)]
    pub payment_status: Option<String>,
}

impl ProviderEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from(self.type_.as_str())
    }

    pub fn session(&self) -> Result<SessionObject, serde_json::Error> {
        SessionObject::deserialize(&self.data.object)
    }
}
