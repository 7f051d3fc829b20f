//! Ranking and reference-resolution engine for a credit card
//! recommendation assistant.
//!
//! The conversational runtime (dialogue management, slot filling, NLU)
//! lives elsewhere; this crate owns the decision logic it calls into:
//! eligibility filtering and utility ranking over the card catalogue,
//! resolution of "the second one" / "the Sapphire card" style follow-up
//! references, fuzzy mapping of free-text feature phrases to catalogue
//! columns, and rendering of the resolved attribute into a reply.

pub mod advisor;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod telemetry;
