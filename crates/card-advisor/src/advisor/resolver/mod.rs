//! Resolution of a user's follow-up reference ("the second one", "the
//! Sapphire card") to a single recommended or catalogued card.

mod feature;
mod ordinal;

pub use feature::{FeatureColumnMapper, FuzzyFeatureMapper, DEFAULT_SIMILARITY_THRESHOLD};

use super::state::RecommendationState;
use ordinal::{card_for_slot, parse_ordinal};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Raw entity values extracted by the NLU layer for the latest turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub card_name: Option<String>,
    #[serde(default)]
    pub card_feature: Option<String>,
    #[serde(default)]
    pub ordinal_reference: Option<String>,
}

/// How a card name was bound, in decreasing order of confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Entity text equalled a recommended card name.
    RecommendedExact,
    /// Entity text was contained in a recommended card name.
    RecommendedPartial,
    /// Entity text did not match the recommendation list; the raw text
    /// goes to a general catalogue lookup.
    GeneralLookup,
    /// Bound through an ordinal against the recommendation slots.
    Ordinal,
}

impl MatchSource {
    /// Whether the name came out of the recommendation list, which
    /// turns a later catalogue miss into a data-inconsistency signal.
    pub fn from_recommendation(self) -> bool {
        matches!(
            self,
            MatchSource::RecommendedExact | MatchSource::RecommendedPartial | MatchSource::Ordinal
        )
    }
}

/// Outcome of entity/ordinal resolution, before catalogue binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceOutcome {
    /// A single target card name was determined.
    Card {
        name: String,
        source: MatchSource,
        /// A substring match landed on several recommended names; the
        /// first list occurrence was kept.
        ambiguous: bool,
    },
    /// An ordinal was used but the mapped slot holds no card.
    OrdinalOutOfRange { ordinal: String },
    /// Neither a name nor an ordinal entity was present.
    NoReferenceDetected,
}

/// Resolve the latest entities against the recommendation snapshot.
///
/// An explicit name wins over an ordinal; the ordinal path only runs
/// when no name entity is present at all.
pub fn resolve_reference(
    entities: &ExtractedEntities,
    state: &RecommendationState,
) -> ReferenceOutcome {
    if let Some(card_name) = entities
        .card_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
    {
        return resolve_name(card_name, state);
    }

    if let Some(ordinal) = entities
        .ordinal_reference
        .as_deref()
        .filter(|ordinal| !ordinal.trim().is_empty())
    {
        return resolve_ordinal(ordinal, state);
    }

    debug!("no card_name or ordinal_reference entity detected");
    ReferenceOutcome::NoReferenceDetected
}

fn resolve_name(entity: &str, state: &RecommendationState) -> ReferenceOutcome {
    let needle = entity.trim().to_lowercase();

    if let Some(exact) = state
        .names()
        .find(|name| name.to_lowercase() == needle)
    {
        debug!(card = %exact, "exact match in recommended list");
        return ReferenceOutcome::Card {
            name: exact.to_string(),
            source: MatchSource::RecommendedExact,
            ambiguous: false,
        };
    }

    let mut partials = state
        .names()
        .filter(|name| name.to_lowercase().contains(&needle));
    if let Some(partial) = partials.next() {
        let ambiguous = partials.next().is_some();
        debug!(card = %partial, ambiguous, "partial match in recommended list");
        return ReferenceOutcome::Card {
            name: partial.to_string(),
            source: MatchSource::RecommendedPartial,
            ambiguous,
        };
    }

    debug!(entity = %entity, "entity not in recommended list; deferring to general lookup");
    ReferenceOutcome::Card {
        name: entity.trim().to_string(),
        source: MatchSource::GeneralLookup,
        ambiguous: false,
    }
}

fn resolve_ordinal(ordinal: &str, state: &RecommendationState) -> ReferenceOutcome {
    let target = parse_ordinal(ordinal).and_then(|slot| card_for_slot(slot, state));

    match target {
        Some(name) => {
            debug!(ordinal = %ordinal, card = %name, "mapped ordinal to recommended card");
            ReferenceOutcome::Card {
                name: name.to_string(),
                source: MatchSource::Ordinal,
                ambiguous: false,
            }
        }
        None => ReferenceOutcome::OrdinalOutOfRange {
            ordinal: ordinal.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(name: Option<&str>, ordinal: Option<&str>) -> ExtractedEntities {
        ExtractedEntities {
            card_name: name.map(str::to_string),
            card_feature: None,
            ordinal_reference: ordinal.map(str::to_string),
        }
    }

    fn state() -> RecommendationState {
        RecommendationState::from_names(["Chase Sapphire Preferred", "Amex Gold"])
    }

    #[test]
    fn exact_name_beats_substring() {
        let outcome = resolve_reference(&entities(Some("amex gold"), None), &state());
        assert_eq!(
            outcome,
            ReferenceOutcome::Card {
                name: "Amex Gold".to_string(),
                source: MatchSource::RecommendedExact,
                ambiguous: false,
            }
        );
    }

    #[test]
    fn substring_binds_to_containing_recommendation() {
        let outcome = resolve_reference(&entities(Some("sapphire"), None), &state());
        assert_eq!(
            outcome,
            ReferenceOutcome::Card {
                name: "Chase Sapphire Preferred".to_string(),
                source: MatchSource::RecommendedPartial,
                ambiguous: false,
            }
        );
    }

    #[test]
    fn substring_over_multiple_recommendations_flags_ambiguity() {
        let state = RecommendationState::from_names(["Chase Sapphire Preferred", "Chase Freedom"]);
        let outcome = resolve_reference(&entities(Some("chase"), None), &state);
        match outcome {
            ReferenceOutcome::Card {
                name,
                source,
                ambiguous,
            } => {
                assert_eq!(name, "Chase Sapphire Preferred");
                assert_eq!(source, MatchSource::RecommendedPartial);
                assert!(ambiguous);
            }
            other => panic!("expected card outcome, got {other:?}"),
        }
    }

    #[test]
    fn unknown_name_falls_through_to_general_lookup() {
        let outcome = resolve_reference(&entities(Some("Discover It"), None), &state());
        assert_eq!(
            outcome,
            ReferenceOutcome::Card {
                name: "Discover It".to_string(),
                source: MatchSource::GeneralLookup,
                ambiguous: false,
            }
        );
    }

    #[test]
    fn name_entity_wins_over_ordinal() {
        let outcome = resolve_reference(&entities(Some("amex gold"), Some("first")), &state());
        match outcome {
            ReferenceOutcome::Card { source, .. } => {
                assert_eq!(source, MatchSource::RecommendedExact);
            }
            other => panic!("expected card outcome, got {other:?}"),
        }
    }

    #[test]
    fn ordinals_walk_the_recommendation_slots() {
        let full = RecommendationState::from_names(["A", "B", "C"]);
        for (ordinal, expected) in [("first", "A"), ("second", "B"), ("third", "C"), ("last", "C")]
        {
            match resolve_reference(&entities(None, Some(ordinal)), &full) {
                ReferenceOutcome::Card { name, source, .. } => {
                    assert_eq!(name, expected, "{ordinal}");
                    assert_eq!(source, MatchSource::Ordinal);
                }
                other => panic!("expected card for {ordinal}, got {other:?}"),
            }
        }

        let single = RecommendationState::from_names(["A"]);
        match resolve_reference(&entities(None, Some("last")), &single) {
            ReferenceOutcome::Card { name, .. } => assert_eq!(name, "A"),
            other => panic!("expected card, got {other:?}"),
        }
    }

    #[test]
    fn empty_slot_ordinal_is_out_of_range() {
        let single = RecommendationState::from_names(["A"]);
        assert_eq!(
            resolve_reference(&entities(None, Some("second")), &single),
            ReferenceOutcome::OrdinalOutOfRange {
                ordinal: "second".to_string()
            }
        );

        let empty = RecommendationState::cleared();
        for ordinal in ["first", "second", "third", "last"] {
            assert_eq!(
                resolve_reference(&entities(None, Some(ordinal)), &empty),
                ReferenceOutcome::OrdinalOutOfRange {
                    ordinal: ordinal.to_string()
                },
                "{ordinal}"
            );
        }
    }

    #[test]
    fn unknown_ordinal_vocabulary_is_out_of_range() {
        let outcome = resolve_reference(&entities(None, Some("fourth")), &state());
        assert_eq!(
            outcome,
            ReferenceOutcome::OrdinalOutOfRange {
                ordinal: "fourth".to_string()
            }
        );
    }

    #[test]
    fn nothing_detected_without_entities() {
        assert_eq!(
            resolve_reference(&entities(None, None), &state()),
            ReferenceOutcome::NoReferenceDetected
        );
        assert_eq!(
            resolve_reference(&entities(Some("  "), Some("")), &state()),
            ReferenceOutcome::NoReferenceDetected
        );
    }
}
