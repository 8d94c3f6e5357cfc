//! Property tests for session folding

use super::state::SessionState;
use super::transition::*;
use crate::models::{Message, Sender};
use crate::sse::StreamEvent;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

fn ctx(local_id: i64) -> TransitionContext {
    TransitionContext {
        now: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        local_id,
    }
}

fn arb_message(sender: Sender) -> impl Strategy<Value = Message> {
    (1i64..1000, "[a-zA-Z ]{0,12}").prop_map(move |(id, content)| {
        Message::new(
            id,
            sender,
            content,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 1).unwrap(),
        )
    })
}

fn arb_event() -> impl Strategy<Value = StreamEvent> {
    prop_oneof![
        4 => "[a-zA-Z ]{0,8}".prop_map(StreamEvent::AssistantChunk),
        1 => arb_message(Sender::User).prop_map(StreamEvent::UserMessageConfirmed),
        1 => arb_message(Sender::Assistant).prop_map(StreamEvent::AssistantMessageConfirmed),
        1 => Just(StreamEvent::StreamComplete),
        1 => "[a-z ]{1,10}".prop_map(StreamEvent::StreamError),
        1 => Just(StreamEvent::Unrecognized { event_type: "ping".to_string(), raw: "{}".to_string() }),
    ]
}

/// One step a collaborator can cause.
#[derive(Debug, Clone)]
enum Step {
    Send(String),
    Event(StreamEvent),
    End,
    Reset,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => "[a-z]{0,5}".prop_map(Step::Send),
        6 => arb_event().prop_map(Step::Event),
        1 => Just(Step::End),
        1 => Just(Step::Reset),
    ]
}

/// Apply a result, carrying out the rollback a `Fail` effect asks for.
fn settle(result: TransitionResult, next_id: &mut i64) -> SessionState {
    let mut state = result.new_state;
    for effect in result.effects {
        if let Effect::Fail { reason } = effect {
            *next_id -= 1;
            state = fail(&state, &reason, &ctx(*next_id)).new_state;
        }
    }
    state
}

proptest! {
    #[test]
    fn at_most_one_sentinel(steps in prop::collection::vec(arb_step(), 0..40)) {
        let mut state = SessionState::default();
        let mut next_id = -1i64;

        for step in steps {
            next_id -= 1;
            let context = ctx(next_id);
            let result = match step {
                Step::Send(text) => match begin_send(&state, &text, &context) {
                    Ok(result) => result,
                    Err(_) => continue,
                },
                Step::Event(event) => transition(&state, event, &context),
                Step::End => finish_stream(&state, &context),
                Step::Reset => reset(),
            };
            state = settle(result, &mut next_id);

            prop_assert!(state.sentinel_count() <= 1);
            if !state.phase.is_busy() {
                prop_assert!(state.accumulated_text.is_empty());
                prop_assert_eq!(state.sentinel_count(), 0);
            }
        }
    }

    #[test]
    fn failure_always_ends_idle_with_apology(
        events in prop::collection::vec(arb_event(), 0..10),
        reason in "[a-z]{1,10}",
    ) {
        let mut next_id = -2i64;
        let mut state = begin_send(&SessionState::default(), "hello", &ctx(next_id))
            .unwrap()
            .new_state;

        for event in events {
            if event.is_terminal() {
                break;
            }
            next_id -= 1;
            let result = transition(&state, event, &ctx(next_id));
            state = settle(result, &mut next_id);
        }

        next_id -= 1;
        let result = raise(&state, reason.clone());
        state = settle(result, &mut next_id);

        prop_assert!(state.phase.is_idle());
        prop_assert_eq!(state.last_error.as_deref(), Some(reason.as_str()));
        prop_assert!(state.messages.iter().all(|m| !m.is_from_user()));
        prop_assert_eq!(state.sentinel_count(), 0);
        prop_assert!(state.pending().is_none());
    }
}
