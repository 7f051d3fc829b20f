//! Eligibility filtering and utility ranking over the card catalogue.

use super::predictor::EligibilityPredictor;
use super::profile::{InputSchema, UserProfile, ANNUAL_INCOME, FICO_HIGH};
use crate::catalogue::{CardCatalogue, CardRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Catalogue row enriched with the broadcast approval probability and
/// the derived ranking score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCard {
    pub card: CardRecord,
    pub p_approve: f64,
    pub utility: f64,
}

/// Which startup artifact is unavailable when a ranking request
/// arrives. Re-checked cheaply on every call; the loads themselves
/// happen once at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationGap {
    Predictor,
    Schema,
    Catalogue,
}

impl fmt::Display for ConfigurationGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationGap::Predictor => write!(f, "eligibility model not loaded"),
            ConfigurationGap::Schema => write!(f, "input schema not loaded or empty"),
            ConfigurationGap::Catalogue => write!(f, "card catalogue not loaded or empty"),
        }
    }
}

/// Ranking failures: configuration failures are process-scoped,
/// request failures are per-caller. An empty result is not an error.
#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("recommendation system unavailable: {0}")]
    Configuration(ConfigurationGap),
    #[error("profile is missing required columns: {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}

/// Stateless engine combining the predictor, its input schema, and
/// the card catalogue.
pub struct RankingEngine<P> {
    catalogue: Arc<CardCatalogue>,
    schema: InputSchema,
    predictor: Option<Arc<P>>,
}

impl<P> RankingEngine<P>
where
    P: EligibilityPredictor,
{
    pub fn new(
        catalogue: Arc<CardCatalogue>,
        schema: InputSchema,
        predictor: Option<Arc<P>>,
    ) -> Self {
        Self {
            catalogue,
            schema,
            predictor,
        }
    }

    /// Rank the catalogue for one user profile.
    ///
    /// The predictor runs once on the full profile; the resulting
    /// probability is broadcast to every eligible card, never
    /// recomputed per card. Cards failing either eligibility bound are
    /// excluded entirely. An empty result means "not currently
    /// eligible for anything" and is a normal outcome.
    pub fn rank(
        &self,
        profile: &UserProfile,
        top_n: usize,
    ) -> Result<Vec<RankedCard>, RankingError> {
        let predictor = self
            .predictor
            .as_ref()
            .ok_or(RankingError::Configuration(ConfigurationGap::Predictor))?;
        if self.schema.is_empty() {
            return Err(RankingError::Configuration(ConfigurationGap::Schema));
        }
        if self.catalogue.is_empty() {
            return Err(RankingError::Configuration(ConfigurationGap::Catalogue));
        }

        let missing = profile.missing_columns(&self.schema);
        if !missing.is_empty() {
            return Err(RankingError::MissingColumns { missing });
        }

        let features = profile
            .feature_vector(&self.schema)
            .unwrap_or_default();
        let p_approve = predictor.approval_probability(&features);
        debug!(p_approve, "predicted approval probability");

        let fico_high = profile.get(FICO_HIGH).ok_or_else(|| {
            RankingError::MissingColumns {
                missing: vec![FICO_HIGH.to_string()],
            }
        })?;
        let annual_inc = profile.get(ANNUAL_INCOME).ok_or_else(|| {
            RankingError::MissingColumns {
                missing: vec![ANNUAL_INCOME.to_string()],
            }
        })?;

        let mut eligible: Vec<RankedCard> = Vec::new();
        for card in self.catalogue.cards() {
            let Some(inputs) = card.ranking_inputs() else {
                warn!(card = %card.card_name, "skipping card with incomplete ranking numerics");
                continue;
            };

            if fico_high < inputs.min_credit_score || annual_inc < inputs.min_income {
                continue;
            }

            let utility = p_approve * inputs.rewards_score - inputs.annual_fee / 100.0;
            eligible.push(RankedCard {
                card: card.clone(),
                p_approve,
                utility,
            });
        }

        if eligible.is_empty() {
            warn!("no cards meet the minimum score/income requirements");
            return Ok(eligible);
        }

        // Stable sort keeps catalogue row order on equal utility.
        eligible.sort_by(|a, b| {
            b.utility
                .partial_cmp(&a.utility)
                .unwrap_or(Ordering::Equal)
        });
        eligible.truncate(top_n);

        Ok(eligible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::profile::InputSchema;

    struct FixedPredictor(f64);

    impl EligibilityPredictor for FixedPredictor {
        fn approval_probability(&self, _features: &[f64]) -> f64 {
            self.0
        }
    }

    fn card(name: &str, min_score: f64, min_income: f64, rewards: f64, fee: f64) -> CardRecord {
        CardRecord {
            card_name: name.to_string(),
            issuer: None,
            annual_fee: Some(fee),
            apr_min: None,
            apr_max: None,
            min_credit_score: Some(min_score),
            min_income: Some(min_income),
            rewards_score: Some(rewards),
            foreign_transaction_fee: None,
            signup_bonus_details: None,
            rewards_details: None,
            rewards_type: None,
            travel_insurance_details: None,
            intro_apr_purchase_details: None,
            intro_apr_bt_details: None,
            application_link_placeholder: None,
        }
    }

    fn catalogue_of(cards: Vec<CardRecord>) -> Arc<CardCatalogue> {
        let mut csv = String::from(
            "card_name,annual_fee,min_credit_score,min_income,rewards_score\n",
        );
        for card in &cards {
            csv.push_str(&format!(
                "{},{},{},{},{}\n",
                card.card_name,
                card.annual_fee.unwrap(),
                card.min_credit_score.unwrap(),
                card.min_income.unwrap(),
                card.rewards_score.unwrap(),
            ));
        }
        Arc::new(CardCatalogue::from_reader(std::io::Cursor::new(csv)).expect("catalogue parses"))
    }

    fn schema() -> InputSchema {
        InputSchema::new([ANNUAL_INCOME, FICO_HIGH, "dti", "emp_length_num"])
    }

    fn profile() -> UserProfile {
        UserProfile::new()
            .with(ANNUAL_INCOME, 60000.0)
            .with(FICO_HIGH, 720.0)
            .with("dti", 20.0)
            .with("emp_length_num", 5.0)
    }

    fn engine(cards: Vec<CardRecord>, p: f64) -> RankingEngine<FixedPredictor> {
        RankingEngine::new(
            catalogue_of(cards),
            schema(),
            Some(Arc::new(FixedPredictor(p))),
        )
    }

    #[test]
    fn cards_appear_iff_both_bounds_hold() {
        let engine = engine(
            vec![
                card("Within Both", 700.0, 50000.0, 8.0, 95.0),
                card("Score Too High", 750.0, 50000.0, 9.0, 0.0),
                card("Income Too High", 700.0, 70000.0, 9.0, 0.0),
            ],
            0.8,
        );

        let ranked = engine.rank(&profile(), 3).expect("ranking succeeds");
        let names: Vec<_> = ranked.iter().map(|r| r.card.card_name.as_str()).collect();
        assert_eq!(names, ["Within Both"]);
    }

    #[test]
    fn utility_is_non_increasing_and_ties_keep_catalogue_order() {
        // Equal utility: p * rewards - fee/100 identical for both tie cards.
        let engine = engine(
            vec![
                card("Tie First", 600.0, 20000.0, 5.0, 0.0),
                card("Tie Second", 600.0, 20000.0, 5.0, 0.0),
                card("Winner", 600.0, 20000.0, 9.0, 0.0),
            ],
            0.5,
        );

        let ranked = engine.rank(&profile(), 3).expect("ranking succeeds");
        let names: Vec<_> = ranked.iter().map(|r| r.card.card_name.as_str()).collect();
        assert_eq!(names, ["Winner", "Tie First", "Tie Second"]);
        assert!(ranked.windows(2).all(|w| w[0].utility >= w[1].utility));
    }

    #[test]
    fn utility_combines_broadcast_probability_fee_and_rewards() {
        let engine = engine(vec![card("Only", 700.0, 50000.0, 8.5, 95.0)], 0.8);
        let ranked = engine.rank(&profile(), 1).expect("ranking succeeds");
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].p_approve - 0.8).abs() < 1e-12);
        assert!((ranked[0].utility - (0.8 * 8.5 - 0.95)).abs() < 1e-12);
    }

    #[test]
    fn never_returns_more_than_top_n() {
        let cards = (0..5)
            .map(|i| card(&format!("Card {i}"), 600.0, 20000.0, 5.0 + i as f64, 0.0))
            .collect();
        let engine = engine(cards, 0.5);
        let ranked = engine.rank(&profile(), 3).expect("ranking succeeds");
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn fewer_than_top_n_when_fewer_eligible() {
        let engine = engine(vec![card("Only", 600.0, 20000.0, 5.0, 0.0)], 0.5);
        let ranked = engine.rank(&profile(), 3).expect("ranking succeeds");
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn no_eligible_cards_is_an_empty_ok() {
        let engine = engine(vec![card("Unreachable", 800.0, 150000.0, 9.0, 0.0)], 0.9);
        let ranked = engine.rank(&profile(), 3).expect("ranking succeeds");
        assert!(ranked.is_empty());
    }

    #[test]
    fn any_missing_schema_column_is_a_request_failure() {
        let engine = engine(vec![card("Only", 600.0, 20000.0, 5.0, 0.0)], 0.5);
        for dropped in ["dti", FICO_HIGH, ANNUAL_INCOME, "emp_length_num"] {
            let mut incomplete = UserProfile::new();
            for column in schema().columns() {
                if column != dropped {
                    incomplete.insert(column.clone(), 1.0);
                }
            }
            match engine.rank(&incomplete, 3) {
                Err(RankingError::MissingColumns { missing }) => {
                    assert_eq!(missing, [dropped.to_string()]);
                }
                other => panic!("expected missing-columns failure, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_predictor_is_a_configuration_failure() {
        let engine: RankingEngine<FixedPredictor> = RankingEngine::new(
            catalogue_of(vec![card("Only", 600.0, 20000.0, 5.0, 0.0)]),
            schema(),
            None,
        );
        match engine.rank(&profile(), 3) {
            Err(RankingError::Configuration(ConfigurationGap::Predictor)) => {}
            other => panic!("expected predictor gap, got {other:?}"),
        }
    }

    #[test]
    fn empty_schema_and_empty_catalogue_are_configuration_failures() {
        let no_schema = RankingEngine::new(
            catalogue_of(vec![card("Only", 600.0, 20000.0, 5.0, 0.0)]),
            InputSchema::empty(),
            Some(Arc::new(FixedPredictor(0.5))),
        );
        match no_schema.rank(&profile(), 3) {
            Err(RankingError::Configuration(ConfigurationGap::Schema)) => {}
            other => panic!("expected schema gap, got {other:?}"),
        }

        let no_catalogue = RankingEngine::new(
            Arc::new(CardCatalogue::empty()),
            schema(),
            Some(Arc::new(FixedPredictor(0.5))),
        );
        match no_catalogue.rank(&profile(), 3) {
            Err(RankingError::Configuration(ConfigurationGap::Catalogue)) => {}
            other => panic!("expected catalogue gap, got {other:?}"),
        }
    }
}
