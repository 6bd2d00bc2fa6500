use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(TeamId);
id_newtype!(UserId);

pub const FIRST_ROUND: u32 = 1;

/// Key under which a team's completion time for `index` is stored in `finishTimes`.
pub fn finish_time_key(index: usize) -> String {
    format!("q{index}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub title: String,
    pub content: String,
}

impl Question {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: UserId,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub members: Vec<Member>,
    pub current_question_index: usize,
    pub finished_members: Vec<UserId>,
    pub round: u32,
    /// Elapsed milliseconds keyed by [`finish_time_key`].
    pub finish_times: BTreeMap<String, i64>,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>, founder: Member) -> Self {
        Self {
            id,
            name: name.into(),
            members: vec![founder],
            current_question_index: 0,
            finished_members: Vec::new(),
            round: FIRST_ROUND,
            finish_times: BTreeMap::new(),
        }
    }

    pub fn has_member(&self, user_id: &UserId) -> bool {
        self.members.iter().any(|m| &m.user_id == user_id)
    }

    pub fn has_finished(&self, user_id: &UserId) -> bool {
        self.finished_members.contains(user_id)
    }

    pub fn all_members_finished(&self) -> bool {
        self.finished_members.len() == self.members.len()
    }

    pub fn reset_progress(&mut self) {
        self.current_question_index = 0;
        self.finished_members.clear();
        self.finish_times.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventState {
    pub is_initialized: bool,
    pub round: u32,
    pub timer_running: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub pause_time: Option<DateTime<Utc>>,
    pub round1_questions: Vec<Question>,
    pub round2_questions: Vec<Question>,
    pub teams: BTreeMap<TeamId, Team>,
}

impl EventState {
    pub fn new(round1_questions: Vec<Question>, round2_questions: Vec<Question>) -> Self {
        Self {
            is_initialized: false,
            round: FIRST_ROUND,
            timer_running: false,
            start_time: None,
            pause_time: None,
            round1_questions,
            round2_questions,
            teams: BTreeMap::new(),
        }
    }

    /// Questions for the event-wide round. Teams advance against this list, not their own
    /// `round` field.
    pub fn active_questions(&self) -> &[Question] {
        if self.round == FIRST_ROUND {
            &self.round1_questions
        } else {
            &self.round2_questions
        }
    }
}

impl Default for EventState {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}
