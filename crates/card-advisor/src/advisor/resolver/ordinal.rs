use crate::advisor::state::RecommendationState;

/// Position a user's ordinal phrase maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OrdinalSlot {
    First,
    Second,
    Third,
    Last,
}

/// Canonical ordinal vocabularies. Anything outside these sets stays
/// unmapped and surfaces as an out-of-range reference.
pub(crate) fn parse_ordinal(text: &str) -> Option<OrdinalSlot> {
    match text.trim().to_lowercase().as_str() {
        "first" | "1st" | "initial" | "primary" | "1" => Some(OrdinalSlot::First),
        "second" | "2nd" | "2" => Some(OrdinalSlot::Second),
        "third" | "3rd" | "3" => Some(OrdinalSlot::Third),
        "last" | "final" | "ending" => Some(OrdinalSlot::Last),
        _ => None,
    }
}

pub(crate) fn card_for_slot<'a>(
    slot: OrdinalSlot,
    state: &'a RecommendationState,
) -> Option<&'a str> {
    match slot {
        OrdinalSlot::First => state.slot(1),
        OrdinalSlot::Second => state.slot(2),
        OrdinalSlot::Third => state.slot(3),
        OrdinalSlot::Last => state.last_recommended(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_vocabularies_map_to_positions() {
        for text in ["first", "1st", "initial", "primary", "1", " First "] {
            assert_eq!(parse_ordinal(text), Some(OrdinalSlot::First), "{text}");
        }
        for text in ["second", "2nd", "2"] {
            assert_eq!(parse_ordinal(text), Some(OrdinalSlot::Second), "{text}");
        }
        for text in ["third", "3rd", "3"] {
            assert_eq!(parse_ordinal(text), Some(OrdinalSlot::Third), "{text}");
        }
        for text in ["last", "final", "ending"] {
            assert_eq!(parse_ordinal(text), Some(OrdinalSlot::Last), "{text}");
        }
        assert_eq!(parse_ordinal("fourth"), None);
    }

    #[test]
    fn last_resolves_to_deepest_filled_slot() {
        let full = RecommendationState::from_names(["A", "B", "C"]);
        assert_eq!(card_for_slot(OrdinalSlot::Last, &full), Some("C"));

        let single = RecommendationState::from_names(["A"]);
        assert_eq!(card_for_slot(OrdinalSlot::Last, &single), Some("A"));

        let empty = RecommendationState::cleared();
        assert_eq!(card_for_slot(OrdinalSlot::Last, &empty), None);
    }

    #[test]
    fn positional_slots_read_straight_through() {
        let state = RecommendationState::from_names(["A", "B"]);
        assert_eq!(card_for_slot(OrdinalSlot::First, &state), Some("A"));
        assert_eq!(card_for_slot(OrdinalSlot::Second, &state), Some("B"));
        assert_eq!(card_for_slot(OrdinalSlot::Third, &state), None);
    }
}
