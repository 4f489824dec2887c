use log::*;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};

pub const ANONYMOUS: &str = "Anonymous";

/// Raw message as delivered by the real-time feed. Only the discriminator
/// (`for`) and the first entry of `message` are ever looked at.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedMessage {
    #[serde(rename = "for", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Value,
}

impl FeedMessage {
    pub fn first_payload(&self) -> FeedPayload {
        let first = match &self.message {
            Value::Array(entries) => entries.first(),
            obj @ Value::Object(_) => Some(obj),
            _ => None,
        };
        first
            .and_then(|v| FeedPayload::deserialize(v).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<Amount>,
}

impl FeedPayload {
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(ANONYMOUS)
            .to_string()
    }

    pub fn amount(&self) -> f64 {
        self.amount.as_ref().map_or(0.0, Amount::value)
    }
}

/// Feeds are inconsistent about whether amounts are numbers or numeric strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn value(&self) -> f64 {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse().unwrap_or(0.0),
        };
        if value.is_finite() { value } else { 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Subscriber { name: String },
    Donation { name: String, amount: f64 },
}

impl FeedEvent {
    /// Returns `None` for messages without a discriminator or with a kind we
    /// don't react to
    pub fn from_message(message: &FeedMessage) -> Option<Self> {
        let kind = message.kind.as_deref()?;
        let payload = message.first_payload();
        match kind {
            "subscriber" => Some(Self::Subscriber {
                name: payload.display_name(),
            }),
            "donation" => Some(Self::Donation {
                name: payload.display_name(),
                amount: payload.amount(),
            }),
            _ => None,
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        let message: FeedMessage = match serde_json::from_str(text) {
            Ok(m) => m,
            Err(e) => {
                debug!("Dropping malformed feed message: {e}");
                return None;
            }
        };
        let event = Self::from_message(&message);
        if event.is_none() {
            trace!("Ignoring feed message of kind {:?}", message.kind);
        }
        event
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Subscriber { name } | Self::Donation { name, .. } => name,
        }
    }
}

impl Display for FeedEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Subscriber { name } => write!(f, "subscriber {name}"),
            Self::Donation { name, amount } => write!(f, "donation of {amount} from {name}"),
        }
    }
}
