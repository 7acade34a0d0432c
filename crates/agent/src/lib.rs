//! Dialog runtime - interpretation, dispatch and conversation tracking
//!
//! A turn flows through three pieces:
//! 1. **Interpretation** (`interpreter`) - text → `(Intent, entities)` via the
//!    NLU client, with a safe fallback when the service fails
//! 2. **Dispatch** (`dispatcher`) - confidence gate, handler lookup by intent
//!    name, single-turn memory for repeats
//! 3. **Tracking** (`tracker`) - glues the two together per utterance
//!
//! Response generation lives in `handlers`; every handler implements
//! `ActionHandler` and is registered on the dispatcher under its intent name.

pub mod dispatcher;
pub mod handlers;
pub mod interpreter;
pub mod tracker;

pub use dispatcher::ActionDispatcher;
pub use handlers::{ActionHandler, HandlerOutcome};
pub use interpreter::Interpreter;
pub use tracker::DialogTracker;
