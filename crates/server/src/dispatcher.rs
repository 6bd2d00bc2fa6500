use chrono::{DateTime, Utc};
use shared::{
    domain::{finish_time_key, EventState, Member, Team},
    protocol::{
        ClientAction, FinishQuestionPayload, JoinTeamPayload, TimerCommand,
        UpdateQuestionsPayload,
    },
};
use tracing::debug;

use crate::elapsed::elapsed;

/// Applies `action` to `state` and reports whether anything clients can observe changed.
///
/// References to unknown teams or users are ignored rather than reported.
pub fn apply(state: &mut EventState, action: ClientAction, now: DateTime<Utc>) -> bool {
    match action {
        ClientAction::InitializeEvent => initialize_event(state),
        ClientAction::JoinOrCreateTeam(payload) => join_or_create_team(state, payload),
        ClientAction::FinishQuestion(payload) => finish_question(state, payload, now),
        ClientAction::UpdateQuestions(payload) => update_questions(state, payload),
        ClientAction::TimerControl(command) => timer_control(state, command, now),
        ClientAction::Unrecognized { action_type } => {
            debug!(%action_type, "ignoring unrecognized action");
            false
        }
    }
}

fn initialize_event(state: &mut EventState) -> bool {
    if state.is_initialized {
        return false;
    }
    state.is_initialized = true;
    true
}

fn join_or_create_team(state: &mut EventState, payload: JoinTeamPayload) -> bool {
    let JoinTeamPayload {
        team_id,
        team_name,
        user_name,
        user_id,
    } = payload;

    if let Some(team) = state.teams.get_mut(&team_id) {
        if team.has_member(&user_id) {
            return false;
        }
        team.members.push(Member { user_id, user_name });
        return true;
    }

    let team = Team::new(team_id.clone(), team_name, Member { user_id, user_name });
    state.teams.insert(team_id, team);
    true
}

fn finish_question(state: &mut EventState, payload: FinishQuestionPayload, now: DateTime<Utc>) -> bool {
    let question_count = state.active_questions().len();
    let elapsed_ms = elapsed(state, now).num_milliseconds();

    let Some(team) = state.teams.get_mut(&payload.team_id) else {
        return false;
    };
    if !team.has_member(&payload.user_id) || team.has_finished(&payload.user_id) {
        return false;
    }

    team.finished_members.push(payload.user_id);
    if team.all_members_finished() && team.current_question_index < question_count {
        team.finish_times
            .insert(finish_time_key(team.current_question_index), elapsed_ms);
        team.current_question_index += 1;
        team.finished_members.clear();
    }
    true
}

fn update_questions(state: &mut EventState, payload: UpdateQuestionsPayload) -> bool {
    state.round1_questions = payload.round1_questions.unwrap_or_default();
    state.round2_questions = payload.round2_questions.unwrap_or_default();

    // A shorter list must not leave a team pointing past the end of the active round.
    let question_count = state.active_questions().len();
    for team in state.teams.values_mut() {
        team.current_question_index = team.current_question_index.min(question_count);
    }
    true
}

fn timer_control(state: &mut EventState, command: TimerCommand, now: DateTime<Utc>) -> bool {
    match command {
        TimerCommand::Start => {
            let previously_elapsed = elapsed(state, now);
            state.timer_running = true;
            state.start_time = Some(now - previously_elapsed);
            state.pause_time = None;
        }
        TimerCommand::Pause => {
            // A repeated pause keeps the first instant so the paused gap is not counted.
            let already_paused = !state.timer_running && state.pause_time.is_some();
            if !already_paused {
                state.pause_time = Some(now);
            }
            state.timer_running = false;
        }
        TimerCommand::Reset => {
            state.timer_running = false;
            state.start_time = None;
            state.pause_time = None;
            for team in state.teams.values_mut() {
                team.reset_progress();
            }
        }
        TimerCommand::Unrecognized => debug!("unrecognized timer command"),
    }
    true
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
