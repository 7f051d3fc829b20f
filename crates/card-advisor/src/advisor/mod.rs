//! The advisor facade: ranking, reference resolution, and detail
//! rendering composed behind one service type.

pub mod formatter;
pub mod predictor;
pub mod profile;
pub mod ranking;
pub mod resolver;
mod router;
pub mod state;

pub use predictor::{EligibilityPredictor, LogisticEligibilityModel, ModelError};
pub use profile::{InputSchema, SchemaError, UserProfile};
pub use ranking::{ConfigurationGap, RankedCard, RankingEngine, RankingError};
pub use resolver::{
    ExtractedEntities, FeatureColumnMapper, FuzzyFeatureMapper, MatchSource, ReferenceOutcome,
};
pub use router::advisor_router;
pub use state::RecommendationState;

use crate::catalogue::{CardCatalogue, CardLookup, CardRecord};
use std::sync::Arc;
use tracing::warn;

/// Ranked cards plus the recommendation-state update the caller should
/// apply to its conversation. State flows out explicitly; the advisor
/// itself holds no per-conversation data.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub cards: Vec<RankedCard>,
    pub state: RecommendationState,
}

/// A follow-up reference bound to a catalogue row.
#[derive(Debug, PartialEq)]
pub enum CardResolution<'a> {
    Resolved {
        card: &'a CardRecord,
        source: MatchSource,
        ambiguous: bool,
    },
    /// The resolved name matched no catalogue row. When the name came
    /// from the recommendation list this signals drift between the two
    /// data sources.
    NotFound {
        name: String,
        from_recommendation: bool,
    },
    OrdinalOutOfRange {
        ordinal: String,
    },
    NoReferenceDetected,
}

/// Fully rendered answer to a card-details request, tagged so the
/// caller can phrase each failure kind differently.
#[derive(Debug, PartialEq)]
pub enum CardDetailsOutcome {
    Details {
        card_name: String,
        message: String,
        source: MatchSource,
        ambiguous: bool,
    },
    UnknownFeature {
        card_name: String,
        feature: String,
        message: String,
    },
    NotFound {
        name: String,
        from_recommendation: bool,
    },
    OrdinalOutOfRange {
        ordinal: String,
    },
    NoReferenceDetected,
}

/// Service composing the catalogue, the ranking engine, and the
/// feature-mapping strategy.
pub struct CardAdvisor<P, M> {
    catalogue: Arc<CardCatalogue>,
    engine: RankingEngine<P>,
    mapper: Arc<M>,
}

impl<P, M> CardAdvisor<P, M>
where
    P: EligibilityPredictor + 'static,
    M: FeatureColumnMapper + 'static,
{
    pub fn new(
        catalogue: Arc<CardCatalogue>,
        schema: InputSchema,
        predictor: Option<Arc<P>>,
        mapper: Arc<M>,
    ) -> Self {
        let engine = RankingEngine::new(catalogue.clone(), schema, predictor);
        Self {
            catalogue,
            engine,
            mapper,
        }
    }

    /// Rank eligible cards for one profile and produce the matching
    /// recommendation-state update. On failure the caller should reset
    /// its stored state to [`RecommendationState::cleared`].
    pub fn recommend(
        &self,
        profile: &UserProfile,
        top_n: usize,
    ) -> Result<Recommendation, RankingError> {
        let cards = self.engine.rank(profile, top_n)?;
        let state = RecommendationState::from_ranked(&cards);
        Ok(Recommendation { cards, state })
    }

    /// Resolve the latest entities to a catalogue row.
    pub fn resolve_card(
        &self,
        entities: &ExtractedEntities,
        state: &RecommendationState,
    ) -> CardResolution<'_> {
        match resolver::resolve_reference(entities, state) {
            ReferenceOutcome::Card {
                name,
                source,
                ambiguous,
            } => match self.catalogue.find(&name) {
                CardLookup::Exact(card) => CardResolution::Resolved {
                    card,
                    source,
                    ambiguous,
                },
                CardLookup::Partial {
                    card,
                    ambiguous: lookup_ambiguous,
                } => CardResolution::Resolved {
                    card,
                    source,
                    ambiguous: ambiguous || lookup_ambiguous,
                },
                CardLookup::Missing => {
                    let from_recommendation = source.from_recommendation();
                    if from_recommendation {
                        warn!(
                            card = %name,
                            "recommended card is absent from the catalogue; data sources have drifted"
                        );
                    }
                    CardResolution::NotFound {
                        name,
                        from_recommendation,
                    }
                }
            },
            ReferenceOutcome::OrdinalOutOfRange { ordinal } => {
                CardResolution::OrdinalOutOfRange { ordinal }
            }
            ReferenceOutcome::NoReferenceDetected => CardResolution::NoReferenceDetected,
        }
    }

    /// Resolve a reference, map the feature phrase if one is present,
    /// and render the reply.
    pub fn card_details(
        &self,
        entities: &ExtractedEntities,
        state: &RecommendationState,
    ) -> CardDetailsOutcome {
        let (card, source, ambiguous) = match self.resolve_card(entities, state) {
            CardResolution::Resolved {
                card,
                source,
                ambiguous,
            } => (card, source, ambiguous),
            CardResolution::NotFound {
                name,
                from_recommendation,
            } => {
                return CardDetailsOutcome::NotFound {
                    name,
                    from_recommendation,
                }
            }
            CardResolution::OrdinalOutOfRange { ordinal } => {
                return CardDetailsOutcome::OrdinalOutOfRange { ordinal }
            }
            CardResolution::NoReferenceDetected => return CardDetailsOutcome::NoReferenceDetected,
        };

        let feature = entities
            .card_feature
            .as_deref()
            .map(str::trim)
            .filter(|feature| !feature.is_empty());

        let message = match feature {
            Some(feature) => match self.mapper.map_feature(feature) {
                Some(column) => formatter::describe_feature(card, column, feature),
                None => {
                    return CardDetailsOutcome::UnknownFeature {
                        card_name: card.card_name.clone(),
                        feature: feature.to_string(),
                        message: formatter::unknown_feature_text(feature),
                    }
                }
            },
            None => formatter::describe_overview(card),
        };

        CardDetailsOutcome::Details {
            card_name: card.card_name.clone(),
            message,
            source,
            ambiguous,
        }
    }
}
