//! Fuzzy mapping of free-text feature phrases onto catalogue columns.

use crate::catalogue::CardColumn;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Strategy for mapping an extracted feature phrase to a catalogue
/// column. Swappable so exact-dictionary, edit-distance, or embedding
/// matchers can replace the default without touching the resolver.
pub trait FeatureColumnMapper: Send + Sync {
    fn map_feature(&self, text: &str) -> Option<CardColumn>;
}

/// Similarity cutoff on a 0.0-1.0 scale below which no column is
/// guessed.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.80;

static FEATURE_ALIASES: OnceLock<Vec<(String, CardColumn)>> = OnceLock::new();

fn feature_aliases() -> &'static [(String, CardColumn)] {
    FEATURE_ALIASES.get_or_init(|| {
        const ALIAS_TO_COLUMN: &[(&str, CardColumn)] = &[
            ("signup bonus", CardColumn::SignupBonusDetails),
            ("welcome offer", CardColumn::SignupBonusDetails),
            ("bonus", CardColumn::SignupBonusDetails),
            ("rewards", CardColumn::RewardsDetails),
            ("reward details", CardColumn::RewardsDetails),
            ("points system", CardColumn::RewardsType),
            ("reward type", CardColumn::RewardsType),
            ("cashback", CardColumn::RewardsDetails),
            ("miles", CardColumn::RewardsDetails),
            ("points", CardColumn::RewardsDetails),
            ("foreign transaction fee", CardColumn::ForeignTransactionFee),
            ("ftf", CardColumn::ForeignTransactionFee),
            ("international fee", CardColumn::ForeignTransactionFee),
            ("travel insurance", CardColumn::TravelInsuranceDetails),
            ("trip insurance", CardColumn::TravelInsuranceDetails),
            ("travel protection", CardColumn::TravelInsuranceDetails),
            ("travel perks", CardColumn::TravelInsuranceDetails),
            ("intro apr", CardColumn::IntroAprPurchaseDetails),
            ("introductory apr", CardColumn::IntroAprPurchaseDetails),
            ("purchase apr offer", CardColumn::IntroAprPurchaseDetails),
            ("intro apr purchase", CardColumn::IntroAprPurchaseDetails),
            ("intro apr bt", CardColumn::IntroAprBtDetails),
            ("balance transfer offer", CardColumn::IntroAprBtDetails),
            ("intro balance transfer", CardColumn::IntroAprBtDetails),
            ("application link", CardColumn::ApplicationLink),
            ("how to apply", CardColumn::ApplicationLink),
            ("apply", CardColumn::ApplicationLink),
            ("annual fee", CardColumn::AnnualFee),
            ("fee", CardColumn::AnnualFee),
            ("cost", CardColumn::AnnualFee),
            ("apr", CardColumn::AprMin),
            ("interest rate", CardColumn::AprMin),
            ("minimum credit score", CardColumn::MinCreditScore),
            ("credit score", CardColumn::MinCreditScore),
            ("score needed", CardColumn::MinCreditScore),
            ("fico", CardColumn::MinCreditScore),
            ("issuer", CardColumn::Issuer),
            ("who issues", CardColumn::Issuer),
            ("bank", CardColumn::Issuer),
            ("cell phone protection", CardColumn::TravelInsuranceDetails),
            ("phone insurance", CardColumn::TravelInsuranceDetails),
        ];

        ALIAS_TO_COLUMN
            .iter()
            .map(|(alias, column)| (token_sort(alias), *column))
            .collect()
    })
}

/// Token-order-insensitive normalisation: lower-case, split on
/// whitespace, sort, rejoin.
fn token_sort(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut tokens: Vec<&str> = lowered.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn similarity(normalized_input: &str, normalized_alias: &str) -> f64 {
    strsim::normalized_levenshtein(normalized_input, normalized_alias)
}

/// Default mapper: best token-sort similarity over the static alias
/// table, accepted only at or above the threshold. Never partially
/// matches below it, never guesses.
pub struct FuzzyFeatureMapper {
    threshold: f64,
}

impl FuzzyFeatureMapper {
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for FuzzyFeatureMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureColumnMapper for FuzzyFeatureMapper {
    fn map_feature(&self, text: &str) -> Option<CardColumn> {
        let normalized = token_sort(text.trim());
        if normalized.is_empty() {
            return None;
        }

        let (best_alias, best_column, best_score) = feature_aliases()
            .iter()
            .map(|(alias, column)| (alias.as_str(), *column, similarity(&normalized, alias)))
            .max_by(|a, b| a.2.total_cmp(&b.2))?;

        if best_score >= self.threshold {
            debug!(
                feature = %text,
                alias = %best_alias,
                column = best_column.column_name(),
                score = best_score,
                "fuzzy matched feature phrase"
            );
            Some(best_column)
        } else {
            warn!(
                feature = %text,
                best_guess = %best_alias,
                score = best_score,
                threshold = self.threshold,
                "could not confidently match feature phrase"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> FuzzyFeatureMapper {
        FuzzyFeatureMapper::new()
    }

    #[test]
    fn exact_aliases_map_directly() {
        assert_eq!(
            mapper().map_feature("cashback"),
            Some(CardColumn::RewardsDetails)
        );
        assert_eq!(
            mapper().map_feature("fico"),
            Some(CardColumn::MinCreditScore)
        );
        assert_eq!(mapper().map_feature("apr"), Some(CardColumn::AprMin));
        assert_eq!(
            mapper().map_feature("how to apply"),
            Some(CardColumn::ApplicationLink)
        );
    }

    #[test]
    fn matching_is_case_and_token_order_insensitive() {
        assert_eq!(
            mapper().map_feature("Bonus Signup"),
            Some(CardColumn::SignupBonusDetails)
        );
        assert_eq!(
            mapper().map_feature("  FEE ANNUAL  "),
            Some(CardColumn::AnnualFee)
        );
    }

    #[test]
    fn near_misses_above_threshold_still_map() {
        assert_eq!(
            mapper().map_feature("annual fees"),
            Some(CardColumn::AnnualFee)
        );
        assert_eq!(
            mapper().map_feature("travel insurence"),
            Some(CardColumn::TravelInsuranceDetails)
        );
    }

    #[test]
    fn nonsense_far_from_all_aliases_is_unmapped() {
        assert_eq!(mapper().map_feature("zxqvw blorple"), None);
        assert_eq!(mapper().map_feature(""), None);
        assert_eq!(mapper().map_feature("   "), None);
    }

    #[test]
    fn threshold_is_respected() {
        // A lenient mapper accepts what the default rejects.
        let lenient = FuzzyFeatureMapper::with_threshold(0.1);
        assert!(lenient.map_feature("fea").is_some());
        assert_eq!(mapper().map_feature("xyzzyq"), None);
    }
}
