use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A typed value extracted from an utterance, e.g. a location reference.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub entity: String,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity {
    pub fn new(entity: impl Into<String>, value: impl Into<String>) -> Self {
        Self { entity: entity.into(), value: value.into(), ..Self::default() }
    }

    pub fn of_type(entity: impl Into<String>) -> Self {
        Self::new(entity, "")
    }

    pub fn is_type(&self, entity_type: &str) -> bool {
        self.entity == entity_type
    }
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    })
}

/// First entity of the given type, or `default` when none matches.
pub fn find_first<'a>(
    entities: &'a [Entity],
    entity_type: &str,
    default: Option<&'a Entity>,
) -> Option<&'a Entity> {
    entities.iter().find(|entity| entity.is_type(entity_type)).or(default)
}

/// Every entity of the given type, in input order.
pub fn find_all<'a>(entities: &'a [Entity], entity_type: &str) -> Vec<&'a Entity> {
    entities.iter().filter(|entity| entity.is_type(entity_type)).collect()
}

pub fn has_type(entities: &[Entity], entity_type: &str) -> bool {
    find_first(entities, entity_type, None).is_some()
}

#[cfg(test)]
mod tests {
    use super::{find_all, find_first, has_type, Entity};

    fn sample() -> Vec<Entity> {
        vec![
            Entity::new("person", "Татьяна Ивановна"),
            Entity::new("music_room", "музыкальный зал"),
            Entity::new("person", "Тоша"),
        ]
    }

    #[test]
    fn find_first_returns_earliest_match() {
        let entities = sample();
        let found = find_first(&entities, "person", None).expect("person entity should be found");
        assert_eq!(found.value, "Татьяна Ивановна");
    }

    #[test]
    fn find_first_falls_back_to_caller_default() {
        let entities = sample();
        let fallback = Entity::new("swimming_pool", "бассейн");
        let found = find_first(&entities, "swimming_pool", Some(&fallback));
        assert_eq!(found, Some(&fallback));
        assert!(find_first(&entities, "swimming_pool", None).is_none());
    }

    #[test]
    fn find_all_preserves_order() {
        let entities = sample();
        let values: Vec<&str> =
            find_all(&entities, "person").iter().map(|entity| entity.value.as_str()).collect();
        assert_eq!(values, vec!["Татьяна Ивановна", "Тоша"]);
    }

    #[test]
    fn find_all_without_matches_is_empty() {
        let entities = sample();
        assert!(find_all(&entities, "teaching_room").is_empty());
        assert!(find_all(&[], "person").is_empty());
        assert!(!has_type(&entities, "teaching_room"));
    }

    #[test]
    fn decodes_service_payload_with_metadata() {
        let raw = r#"[
            {"entity":"music_room","value":"музыкальный зал","start":4,"end":19,"extractor":"CRFEntityExtractor"},
            {"entity":"floor","value":2},
            {"entity":"swimming_pool"}
        ]"#;
        let entities: Vec<Entity> = serde_json::from_str(raw).expect("entities should decode");

        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].start, Some(4));
        assert_eq!(entities[0].end, Some(19));
        assert_eq!(entities[0].extra["extractor"], "CRFEntityExtractor");
        assert_eq!(entities[1].value, "2");
        assert_eq!(entities[2].value, "");
    }

    #[test]
    fn untagged_entities_decode_with_empty_type() {
        let raw = r#"[
            {"entity":"swimming_pool","value":"бассейн"},
            {"value":"второй"},
            {"entity":null,"value":"этаж"}
        ]"#;
        let entities: Vec<Entity> = serde_json::from_str(raw).expect("entities should decode");

        assert_eq!(entities.len(), 3);
        assert_eq!(entities[1].entity, "");
        assert_eq!(entities[1].value, "второй");
        assert_eq!(entities[2].entity, "");
        assert!(has_type(&entities, "swimming_pool"));
        assert_eq!(find_all(&entities, "").len(), 2);
    }
}
