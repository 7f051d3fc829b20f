//! Card catalogue: the tabular product data every ranking and
//! follow-up question resolves against.
//!
//! The catalogue is loaded once at startup and treated as immutable
//! for the life of the process. Rows keep their file order; lookup and
//! ranking both rely on that order for deterministic tie-breaking.

use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// One row of the catalogue.
///
/// Numeric columns used in filtering and scoring stay optional at the
/// record level; rows missing them are skipped during ranking rather
/// than failing the whole catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub card_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub issuer: Option<String>,
    #[serde(default)]
    pub annual_fee: Option<f64>,
    #[serde(default)]
    pub apr_min: Option<f64>,
    #[serde(default)]
    pub apr_max: Option<f64>,
    #[serde(default)]
    pub min_credit_score: Option<f64>,
    #[serde(default)]
    pub min_income: Option<f64>,
    #[serde(default)]
    pub rewards_score: Option<f64>,
    #[serde(default)]
    pub foreign_transaction_fee: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub signup_bonus_details: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub rewards_details: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub rewards_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub travel_insurance_details: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub intro_apr_purchase_details: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub intro_apr_bt_details: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub application_link_placeholder: Option<String>,
}

/// Numeric inputs a row must carry to participate in ranking.
pub(crate) struct RankingInputs {
    pub(crate) min_credit_score: f64,
    pub(crate) min_income: f64,
    pub(crate) rewards_score: f64,
    pub(crate) annual_fee: f64,
}

impl CardRecord {
    pub(crate) fn ranking_inputs(&self) -> Option<RankingInputs> {
        Some(RankingInputs {
            min_credit_score: self.min_credit_score?,
            min_income: self.min_income?,
            rewards_score: self.rewards_score?,
            annual_fee: self.annual_fee?,
        })
    }
}

/// Catalogue column a free-text feature phrase can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardColumn {
    AnnualFee,
    AprMin,
    AprMax,
    MinCreditScore,
    Issuer,
    SignupBonusDetails,
    RewardsDetails,
    RewardsType,
    ForeignTransactionFee,
    TravelInsuranceDetails,
    IntroAprPurchaseDetails,
    IntroAprBtDetails,
    ApplicationLink,
}

impl CardColumn {
    /// Header name of the backing catalogue column.
    pub const fn column_name(self) -> &'static str {
        match self {
            CardColumn::AnnualFee => "annual_fee",
            CardColumn::AprMin => "apr_min",
            CardColumn::AprMax => "apr_max",
            CardColumn::MinCreditScore => "min_credit_score",
            CardColumn::Issuer => "issuer",
            CardColumn::SignupBonusDetails => "signup_bonus_details",
            CardColumn::RewardsDetails => "rewards_details",
            CardColumn::RewardsType => "rewards_type",
            CardColumn::ForeignTransactionFee => "foreign_transaction_fee",
            CardColumn::TravelInsuranceDetails => "travel_insurance_details",
            CardColumn::IntroAprPurchaseDetails => "intro_apr_purchase_details",
            CardColumn::IntroAprBtDetails => "intro_apr_bt_details",
            CardColumn::ApplicationLink => "application_link_placeholder",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error("failed to read card catalogue: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid card catalogue data: {0}")]
    Csv(#[from] csv::Error),
}

/// In-memory card catalogue preserving file row order.
#[derive(Debug, Default, Clone)]
pub struct CardCatalogue {
    cards: Vec<CardRecord>,
}

/// Result of a name lookup, distinguishing match strength so callers
/// can phrase replies and log drift accordingly.
#[derive(Debug, PartialEq)]
pub enum CardLookup<'a> {
    Exact(&'a CardRecord),
    Partial { card: &'a CardRecord, ambiguous: bool },
    Missing,
}

impl CardCatalogue {
    /// Empty catalogue stand-in used when the data file cannot be
    /// loaded; every ranking request then degrades to a configuration
    /// failure instead of a crash.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogueError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogueError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut cards = Vec::new();
        for record in csv_reader.deserialize::<CardRecord>() {
            cards.push(record?);
        }

        if cards.is_empty() {
            warn!("card catalogue loaded but contains no rows");
        }

        Ok(Self { cards })
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[CardRecord] {
        &self.cards
    }

    /// Look up a card by name: exact case-insensitive equality first,
    /// then substring containment. Multiple containment hits pick the
    /// first catalogue row and flag the ambiguity.
    pub fn find(&self, name: &str) -> CardLookup<'_> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return CardLookup::Missing;
        }

        if let Some(card) = self
            .cards
            .iter()
            .find(|card| card.card_name.to_lowercase() == needle)
        {
            return CardLookup::Exact(card);
        }

        let mut containing = self
            .cards
            .iter()
            .filter(|card| card.card_name.to_lowercase().contains(&needle));

        match containing.next() {
            Some(card) => {
                let ambiguous = containing.next().is_some();
                if ambiguous {
                    warn!(
                        entity = %name,
                        chosen = %card.card_name,
                        "substring lookup matched multiple cards; using the first row"
                    );
                }
                CardLookup::Partial { card, ambiguous }
            }
            None => CardLookup::Missing,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
