//! Conversation session: state, pure transitions and the async controller.

mod controller;
mod state;
pub mod transition;

#[cfg(test)]
mod proptests;

pub use controller::SessionController;
pub use state::{PendingSend, Phase, SessionState};
pub use transition::{Effect, TransitionContext, TransitionError, TransitionResult};
