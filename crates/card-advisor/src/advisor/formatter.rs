//! Rendering of resolved card attributes into reply text.
//!
//! Each catalogue column gets its own formatting branch so the fee,
//! APR, score, and foreign-transaction-fee rules stay independently
//! testable. Missing optional values always degrade to an explicit
//! "not available" message instead of leaking a blank into the reply.

use crate::catalogue::{CardColumn, CardRecord};

/// One-field answer for a resolved card and column. `feature_text` is
/// the user's own phrasing, echoed back in the generic branches.
pub fn describe_feature(card: &CardRecord, column: CardColumn, feature_text: &str) -> String {
    let name = &card.card_name;
    match column {
        CardColumn::AnnualFee => match card.annual_fee {
            Some(fee) => format!("The annual fee for the {name} is: {}.", fee_text(fee)),
            None => not_available(name, feature_text),
        },
        CardColumn::AprMin | CardColumn::AprMax => format!(
            "The Purchase APR for the {name} is: {}.",
            apr_text(card.apr_min, card.apr_max)
        ),
        CardColumn::MinCreditScore => match card.min_credit_score {
            Some(score) => format!(
                "The recommended minimum credit score for the {name} is typically {}.",
                score_text(score)
            ),
            None => not_available(name, feature_text),
        },
        CardColumn::ForeignTransactionFee => format!(
            "For the {name}, the Foreign Transaction Fee is: {}.",
            ftf_text(card.foreign_transaction_fee)
        ),
        CardColumn::Issuer => detail_text(card.issuer.as_deref(), name, feature_text),
        CardColumn::SignupBonusDetails => {
            detail_text(card.signup_bonus_details.as_deref(), name, feature_text)
        }
        CardColumn::RewardsDetails => {
            detail_text(card.rewards_details.as_deref(), name, feature_text)
        }
        CardColumn::RewardsType => detail_text(card.rewards_type.as_deref(), name, feature_text),
        CardColumn::TravelInsuranceDetails => {
            detail_text(card.travel_insurance_details.as_deref(), name, feature_text)
        }
        CardColumn::IntroAprPurchaseDetails => detail_text(
            card.intro_apr_purchase_details.as_deref(),
            name,
            feature_text,
        ),
        CardColumn::IntroAprBtDetails => {
            detail_text(card.intro_apr_bt_details.as_deref(), name, feature_text)
        }
        CardColumn::ApplicationLink => detail_text(
            card.application_link_placeholder.as_deref(),
            name,
            feature_text,
        ),
    }
}

/// General overview when no specific feature was asked about. A zero
/// or absent minimum score omits the score line entirely; a present
/// `rewards_details` appends a one-line key-feature summary.
pub fn describe_overview(card: &CardRecord) -> String {
    let name = &card.card_name;
    let issuer = card.issuer.as_deref().unwrap_or("N/A");

    let score_suffix = match card.min_credit_score {
        Some(score) if score > 0.0 => format!(" (Recommended Score: {:.0}+)", score),
        _ => String::new(),
    };

    let fee = match card.annual_fee {
        Some(fee) => fee_text(fee),
        None => "N/A".to_string(),
    };

    let mut message = format!(
        "Okay, here's a general overview of the {name} from {issuer}{score_suffix}:\n\
         - Annual Fee: {fee}\n\
         - Purchase APR: {apr}",
        apr = apr_text(card.apr_min, card.apr_max),
    );

    if let Some(rewards) = card.rewards_details.as_deref() {
        message.push_str(&format!("\n- Key Feature: {rewards}"));
    }

    message
}

/// Prompt used when a feature phrase resolved to no catalogue column.
pub fn unknown_feature_text(feature_text: &str) -> String {
    format!(
        "Sorry, I'm not sure how to look up '{feature_text}'. I can tell you about things like \
         APR, annual fee, rewards, signup bonus, or travel insurance."
    )
}

fn fee_text(fee: f64) -> String {
    if fee == 0.0 {
        "No Annual Fee".to_string()
    } else {
        format!("${fee:.0}")
    }
}

fn apr_text(apr_min: Option<f64>, apr_max: Option<f64>) -> String {
    match (apr_min, apr_max) {
        (Some(low), Some(high)) if low != high => format!("{low:.1}% - {high:.1}%"),
        (Some(value), _) | (None, Some(value)) => format!("{value:.1}%"),
        (None, None) => "Not Available".to_string(),
    }
}

fn score_text(score: f64) -> String {
    if score > 0.0 {
        format!("{score:.0}+")
    } else {
        "No minimum specified (may be for building credit)".to_string()
    }
}

fn ftf_text(fee: Option<f64>) -> String {
    match fee {
        Some(fee) if fee > 0.0 => format!("{fee}%"),
        Some(_) => "No Foreign Transaction Fee".to_string(),
        None => "Not specified".to_string(),
    }
}

fn detail_text(value: Option<&str>, card_name: &str, feature_text: &str) -> String {
    match value {
        Some(value) => format!("Regarding the {feature_text} for the {card_name}: {value}"),
        None => not_available(card_name, feature_text),
    }
}

fn not_available(card_name: &str, feature_text: &str) -> String {
    format!(
        "I don't have specific details readily available for '{feature_text}' for the {card_name}."
    )
}
