use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("message is not a valid action envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("invalid payload for {action_type}: {source}")]
    Payload {
        action_type: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DecodeError {
    pub fn payload(action_type: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Payload {
            action_type: action_type.into(),
            source,
        }
    }
}
