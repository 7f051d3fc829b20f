use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::resolver::{ExtractedEntities, FeatureColumnMapper};
use super::{
    CardAdvisor, CardDetailsOutcome, EligibilityPredictor, RankingError, Recommendation,
    RecommendationState, UserProfile,
};

/// Router builder exposing the two advisor operations over HTTP.
pub fn advisor_router<P, M>(advisor: Arc<CardAdvisor<P, M>>) -> Router
where
    P: EligibilityPredictor + 'static,
    M: FeatureColumnMapper + 'static,
{
    Router::new()
        .route(
            "/api/v1/advisor/recommendations",
            post(recommend_handler::<P, M>),
        )
        .route(
            "/api/v1/advisor/card-details",
            post(card_details_handler::<P, M>),
        )
        .with_state(advisor)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendRequest {
    pub(crate) profile: BTreeMap<String, f64>,
    #[serde(default = "default_top_n")]
    pub(crate) top_n: usize,
}

fn default_top_n() -> usize {
    3
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendedCardView {
    pub(crate) card_name: String,
    pub(crate) p_approve: f64,
    pub(crate) utility: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecommendResponse {
    pub(crate) message: String,
    pub(crate) recommendations: Vec<RecommendedCardView>,
    pub(crate) state: RecommendationState,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CardDetailsRequest {
    #[serde(flatten)]
    pub(crate) entities: ExtractedEntities,
    #[serde(default)]
    pub(crate) state: RecommendationState,
}

pub(crate) async fn recommend_handler<P, M>(
    State(advisor): State<Arc<CardAdvisor<P, M>>>,
    axum::Json(request): axum::Json<RecommendRequest>,
) -> Response
where
    P: EligibilityPredictor + 'static,
    M: FeatureColumnMapper + 'static,
{
    let profile: UserProfile = request.profile.into_iter().collect();

    match advisor.recommend(&profile, request.top_n) {
        Ok(recommendation) => {
            let response = recommend_response(recommendation);
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Err(error @ RankingError::MissingColumns { .. }) => {
            let payload = json!({
                "error": error.to_string(),
                "state": RecommendationState::cleared(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(error @ RankingError::Configuration(_)) => {
            let payload = json!({
                "error": error.to_string(),
                "state": RecommendationState::cleared(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

fn recommend_response(recommendation: Recommendation) -> RecommendResponse {
    let Recommendation { cards, state } = recommendation;

    if cards.is_empty() {
        return RecommendResponse {
            message: "Sorry, I couldn't find any specific card recommendations based on the \
                      provided information."
                .to_string(),
            recommendations: Vec::new(),
            state,
        };
    }

    let mut message = String::from("Based on your information, here are the cards I recommend:\n");
    let mut recommendations = Vec::with_capacity(cards.len());
    for ranked in cards {
        message.push_str(&format!(
            "- {} (Approval chance: {:.0}%, Utility: {:.1})\n",
            ranked.card.card_name,
            ranked.p_approve * 100.0,
            ranked.utility,
        ));
        recommendations.push(RecommendedCardView {
            card_name: ranked.card.card_name,
            p_approve: ranked.p_approve,
            utility: ranked.utility,
        });
    }

    RecommendResponse {
        message,
        recommendations,
        state,
    }
}

pub(crate) async fn card_details_handler<P, M>(
    State(advisor): State<Arc<CardAdvisor<P, M>>>,
    axum::Json(request): axum::Json<CardDetailsRequest>,
) -> Response
where
    P: EligibilityPredictor + 'static,
    M: FeatureColumnMapper + 'static,
{
    let payload = match advisor.card_details(&request.entities, &request.state) {
        CardDetailsOutcome::Details {
            card_name,
            message,
            source,
            ambiguous,
        } => json!({
            "outcome": "details",
            "card_name": card_name,
            "message": message,
            "source": source,
            "ambiguous": ambiguous,
        }),
        CardDetailsOutcome::UnknownFeature {
            card_name,
            feature,
            message,
        } => json!({
            "outcome": "unknown_feature",
            "card_name": card_name,
            "feature": feature,
            "message": message,
        }),
        CardDetailsOutcome::NotFound {
            name,
            from_recommendation,
        } => {
            let message = if from_recommendation {
                format!(
                    "Sorry, I recommended '{name}' but couldn't find its details in my \
                     catalogue. There might be an inconsistency."
                )
            } else {
                format!(
                    "Sorry, I couldn't find specific details for a card named '{name}' in my \
                     catalogue."
                )
            };
            json!({
                "outcome": "not_found",
                "card_name": name,
                "from_recommendation": from_recommendation,
                "message": message,
            })
        }
        CardDetailsOutcome::OrdinalOutOfRange { ordinal } => json!({
            "outcome": "ordinal_out_of_range",
            "ordinal": ordinal,
            "message": format!(
                "You asked about the {ordinal} card, but I don't have it in the \
                 recommendations. Could you specify the name?"
            ),
        }),
        CardDetailsOutcome::NoReferenceDetected => json!({
            "outcome": "no_reference_detected",
            "message": "Which card are you asking about? You can say 'the first one', 'the \
                        second card', or mention the card name like 'Chase Sapphire'.",
        }),
    };

    (StatusCode::OK, axum::Json(payload)).into_response()
}
