//! Conversation-scoped record of the most recent recommendation.
//!
//! Modeled as an explicit snapshot: the ranking engine produces a new
//! value, the reference resolver only reads it. Nothing here is shared
//! or mutated in place.

use super::ranking::RankedCard;
use serde::{Deserialize, Serialize};

/// Positions tracked from one ranking turn.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Ordered card-name slots from the latest ranking. A `None` slot
/// means no card was recommended in that position. On the wire this is
/// the bare three-element array, e.g. `["Amex Gold", null, null]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationState {
    slots: [Option<String>; MAX_RECOMMENDATIONS],
}

impl RecommendationState {
    /// State with every position explicitly empty, used after a
    /// ranking failure or before the first recommendation.
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn from_ranked(cards: &[RankedCard]) -> Self {
        Self::from_names(cards.iter().map(|ranked| ranked.card.card_name.as_str()))
    }

    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut slots: [Option<String>; MAX_RECOMMENDATIONS] = Default::default();
        for (slot, name) in slots.iter_mut().zip(names) {
            *slot = Some(name.to_string());
        }
        Self { slots }
    }

    /// Card name at a 1-based position.
    pub fn slot(&self, position: usize) -> Option<&str> {
        match position {
            1..=MAX_RECOMMENDATIONS => self.slots[position - 1].as_deref(),
            _ => None,
        }
    }

    /// Last non-empty position, scanning from the bottom up.
    pub fn last_recommended(&self) -> Option<&str> {
        self.slots
            .iter()
            .rev()
            .find_map(|slot| slot.as_deref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter_map(|slot| slot.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}
