use rand::seq::SliceRandom;
use rand::RngCore;
use tracing::warn;
use twinbot_core::domain::entity::has_type;
use twinbot_core::domain::Turn;

pub const DEFAULT_PHRASES: &[&str] = &["Не понял Вас, повторите", "Что что? Повторите еще раз"];
pub const GREETING_OPENINGS: &[&str] = &["Добрый день!", "Здравствуйте!", "Приветствую вас!"];
pub const GREETING_FOLLOW_UPS: &[&str] =
    &["Какой у вас вопрос?", "Меня зовут Тоша. Чем я могу помочь?", ""];
pub const FAREWELL_PHRASES: &[&str] = &["Всего доброго", "До свидания", "Всегда раз помочь"];

/// Way-finding answers, checked in this order.
pub const WAY_DIRECTIONS: &[(&str, &str)] = &[
    ("swimming_pool", "Бассейн находится прямо по коридору"),
    ("music_room", "Музыкальный зал находится на втором этаже"),
    ("teaching_room", "Методическй кабинет закрыт на ремонт"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HandlerOutcome {
    Reply(String),
    /// Answer with the default handler instead.
    Fallback,
    /// Re-dispatch the remembered previous turn.
    Replay,
}

pub trait ActionHandler: Send + Sync {
    /// Intent name this handler answers, lowercase.
    fn intent_name(&self) -> &str;
    fn handle(&self, turn: &Turn, rng: &mut dyn RngCore) -> HandlerOutcome;
}

fn pick(phrases: &[&'static str], rng: &mut dyn RngCore) -> &'static str {
    phrases.choose(rng).copied().unwrap_or_default()
}

#[derive(Clone, Debug, Default)]
pub struct DefaultHandler;

impl ActionHandler for DefaultHandler {
    fn intent_name(&self) -> &str {
        "default"
    }

    fn handle(&self, _turn: &Turn, rng: &mut dyn RngCore) -> HandlerOutcome {
        HandlerOutcome::Reply(pick(DEFAULT_PHRASES, rng).to_string())
    }
}

/// Diagnostic answer for intents nobody has written a handler for yet.
#[derive(Clone, Debug, Default)]
pub struct NotImplementedHandler;

impl ActionHandler for NotImplementedHandler {
    fn intent_name(&self) -> &str {
        "not_implemented"
    }

    fn handle(&self, turn: &Turn, _rng: &mut dyn RngCore) -> HandlerOutcome {
        let intent = &turn.intent;
        warn!(
            event_name = "dialog.handler.missing",
            intent = %intent.name,
            confidence = intent.confidence,
            "handler on_{} not implemented",
            intent.normalized_name()
        );
        HandlerOutcome::Reply(format!(
            "Intent: {}, confidence: {:?}",
            intent.name, intent.confidence
        ))
    }
}

#[derive(Clone, Debug, Default)]
pub struct GreetingHandler;

impl ActionHandler for GreetingHandler {
    fn intent_name(&self) -> &str {
        "twin_greeting"
    }

    fn handle(&self, _turn: &Turn, rng: &mut dyn RngCore) -> HandlerOutcome {
        let opening = pick(GREETING_OPENINGS, rng);
        let follow_up = pick(GREETING_FOLLOW_UPS, rng);
        HandlerOutcome::Reply(format!("{opening} {follow_up}"))
    }
}

#[derive(Clone, Debug, Default)]
pub struct FarewellHandler;

impl ActionHandler for FarewellHandler {
    fn intent_name(&self) -> &str {
        "twin_goodbye"
    }

    fn handle(&self, _turn: &Turn, rng: &mut dyn RngCore) -> HandlerOutcome {
        HandlerOutcome::Reply(pick(FAREWELL_PHRASES, rng).to_string())
    }
}

#[derive(Clone, Debug, Default)]
pub struct RepeatHandler;

impl ActionHandler for RepeatHandler {
    fn intent_name(&self) -> &str {
        "twin_repeat"
    }

    fn handle(&self, _turn: &Turn, _rng: &mut dyn RngCore) -> HandlerOutcome {
        HandlerOutcome::Replay
    }
}

#[derive(Clone, Debug, Default)]
pub struct WayFindingHandler;

impl ActionHandler for WayFindingHandler {
    fn intent_name(&self) -> &str {
        "twin_way"
    }

    fn handle(&self, turn: &Turn, _rng: &mut dyn RngCore) -> HandlerOutcome {
        let ways = WAY_DIRECTIONS
            .iter()
            .filter(|(entity_type, _)| has_type(&turn.entities, entity_type))
            .map(|(_, direction)| *direction)
            .collect::<Vec<_>>();

        if ways.is_empty() {
            return HandlerOutcome::Fallback;
        }
        HandlerOutcome::Reply(ways.join(". "))
    }
}
