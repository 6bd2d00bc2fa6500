use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{EventState, Question, TeamId, UserId},
    error::DecodeError,
};

pub const INITIALIZE_EVENT: &str = "initializeEvent";
pub const JOIN_OR_CREATE_TEAM: &str = "joinOrCreateTeam";
pub const FINISH_QUESTION: &str = "finishQuestion";
pub const UPDATE_QUESTIONS: &str = "updateQuestions";
pub const TIMER_CONTROL: &str = "timerControl";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTeamPayload {
    pub team_id: TeamId,
    pub team_name: String,
    pub user_name: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishQuestionPayload {
    pub team_id: TeamId,
    pub user_id: UserId,
}

/// Absent or `null` lists replace the stored list with an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionsPayload {
    #[serde(default)]
    pub round1_questions: Option<Vec<Question>>,
    #[serde(default)]
    pub round2_questions: Option<Vec<Question>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerCommand {
    Start,
    Pause,
    Reset,
    /// Any other sub-action. Accepted and broadcast without touching the timer.
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerControlPayload {
    pub action: TimerCommand,
}

/// An inbound action, decoded from `{ "type": ..., "payload": ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    InitializeEvent,
    JoinOrCreateTeam(JoinTeamPayload),
    FinishQuestion(FinishQuestionPayload),
    UpdateQuestions(UpdateQuestionsPayload),
    TimerControl(TimerCommand),
    /// A well-formed envelope whose type this server does not handle.
    Unrecognized { action_type: String },
}

#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(default)]
    payload: Value,
}

impl ClientAction {
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let envelope: ActionEnvelope = serde_json::from_str(raw).map_err(DecodeError::Envelope)?;
        Self::from_envelope(envelope.action_type, envelope.payload)
    }

    fn from_envelope(action_type: String, payload: Value) -> Result<Self, DecodeError> {
        let action = match action_type.as_str() {
            INITIALIZE_EVENT => Self::InitializeEvent,
            JOIN_OR_CREATE_TEAM => Self::JoinOrCreateTeam(typed_payload(&action_type, payload)?),
            FINISH_QUESTION => Self::FinishQuestion(typed_payload(&action_type, payload)?),
            UPDATE_QUESTIONS => Self::UpdateQuestions(typed_payload(&action_type, payload)?),
            TIMER_CONTROL => {
                let control: TimerControlPayload = typed_payload(&action_type, payload)?;
                Self::TimerControl(control.action)
            }
            _ => Self::Unrecognized { action_type },
        };
        Ok(action)
    }

    pub fn action_type(&self) -> &str {
        match self {
            Self::InitializeEvent => INITIALIZE_EVENT,
            Self::JoinOrCreateTeam(_) => JOIN_OR_CREATE_TEAM,
            Self::FinishQuestion(_) => FINISH_QUESTION,
            Self::UpdateQuestions(_) => UPDATE_QUESTIONS,
            Self::TimerControl(_) => TIMER_CONTROL,
            Self::Unrecognized { action_type } => action_type,
        }
    }
}

fn typed_payload<T: serde::de::DeserializeOwned>(
    action_type: &str,
    payload: Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(payload).map_err(|e| DecodeError::payload(action_type, e))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerEvent {
    StateUpdate(EventState),
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
