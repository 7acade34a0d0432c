use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;
use twinbot_core::config::DEFAULT_CONFIDENCE_THRESHOLD;
use twinbot_core::domain::{Entity, Intent, Turn};

use crate::handlers::{
    ActionHandler, DefaultHandler, FarewellHandler, GreetingHandler, HandlerOutcome,
    NotImplementedHandler, RepeatHandler, WayFindingHandler,
};

/// Routes interpreted turns to handlers and remembers the last dispatched turn.
///
/// Handlers are looked up by lowercased intent name. Intents at or below the
/// confidence threshold always go to the default handler; confident intents
/// without a registered handler go to the not-implemented handler.
pub struct ActionDispatcher {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
    default_handler: Arc<dyn ActionHandler>,
    not_implemented: Arc<dyn ActionHandler>,
    threshold: f64,
    last_turn: Option<Turn>,
    rng: Box<dyn RngCore + Send>,
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl ActionDispatcher {
    /// Dispatcher with the built-in handler set.
    pub fn new(threshold: f64) -> Self {
        let mut dispatcher = Self::empty(threshold);
        dispatcher.register(DefaultHandler);
        dispatcher.register(GreetingHandler);
        dispatcher.register(FarewellHandler);
        dispatcher.register(RepeatHandler);
        dispatcher.register(WayFindingHandler);
        dispatcher
    }

    /// Dispatcher with no intent handlers; every confident intent is reported
    /// as not implemented.
    pub fn empty(threshold: f64) -> Self {
        Self {
            handlers: HashMap::new(),
            default_handler: Arc::new(DefaultHandler),
            not_implemented: Arc::new(NotImplementedHandler),
            threshold,
            last_turn: None,
            rng: Box::new(StdRng::from_entropy()),
        }
    }

    pub fn with_rng<R>(mut self, rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        self.rng = Box::new(rng);
        self
    }

    /// Registers `handler` for its intent name, replacing any previous one.
    pub fn register<H>(&mut self, handler: H)
    where
        H: ActionHandler + 'static,
    {
        let name = handler.intent_name().trim().to_lowercase();
        self.handlers.insert(name, Arc::new(handler));
    }

    pub fn set_default_handler<H>(&mut self, handler: H)
    where
        H: ActionHandler + 'static,
    {
        self.default_handler = Arc::new(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.last_turn.as_ref()
    }

    pub fn process(&mut self, intent: Intent, entities: Vec<Entity>) -> String {
        let (reply, remembered) = self.respond(Turn::new(intent, entities));
        if let Some(turn) = remembered {
            self.last_turn = Some(turn);
        }
        reply
    }

    /// Produces the reply for `turn` together with the turn to remember, if
    /// any.
    ///
    /// A replay answers with the remembered turn and keeps it remembered. A
    /// repeat with nothing to replay leaves the memory untouched, so the
    /// memory never holds a turn that only asked for a repeat.
    fn respond(&mut self, turn: Turn) -> (String, Option<Turn>) {
        match self.run_handler(&turn) {
            HandlerOutcome::Reply(reply) => (reply, Some(turn)),
            HandlerOutcome::Fallback => (self.default_reply(&turn), Some(turn)),
            HandlerOutcome::Replay => {
                let Some(previous) = self.last_turn.clone() else {
                    debug!(event_name = "dialog.repeat.empty", "nothing to repeat yet");
                    return (self.default_reply(&turn), None);
                };

                debug!(
                    event_name = "dialog.repeat.replay",
                    intent = %previous.intent.name,
                    "replaying previous turn"
                );
                let reply = match self.run_handler(&previous) {
                    HandlerOutcome::Reply(reply) => reply,
                    HandlerOutcome::Fallback | HandlerOutcome::Replay => {
                        self.default_reply(&previous)
                    }
                };
                (reply, Some(previous))
            }
        }
    }

    fn run_handler(&mut self, turn: &Turn) -> HandlerOutcome {
        let handler = self.resolve(&turn.intent);
        handler.handle(turn, self.rng.as_mut())
    }

    fn resolve(&self, intent: &Intent) -> Arc<dyn ActionHandler> {
        if intent.confidence > self.threshold {
            self.handlers
                .get(&intent.normalized_name())
                .cloned()
                .unwrap_or_else(|| Arc::clone(&self.not_implemented))
        } else {
            Arc::clone(&self.default_handler)
        }
    }

    fn default_reply(&mut self, turn: &Turn) -> String {
        let handler = Arc::clone(&self.default_handler);
        match handler.handle(turn, self.rng.as_mut()) {
            HandlerOutcome::Reply(reply) => reply,
            HandlerOutcome::Fallback | HandlerOutcome::Replay => String::new(),
        }
    }
}
