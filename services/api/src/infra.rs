use card_advisor::advisor::{
    CardAdvisor, FuzzyFeatureMapper, InputSchema, LogisticEligibilityModel,
};
use card_advisor::catalogue::CardCatalogue;
use card_advisor::config::DataConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Concrete advisor wired with the production predictor and mapper.
pub(crate) type ProductionAdvisor = CardAdvisor<LogisticEligibilityModel, FuzzyFeatureMapper>;

/// Load the three data artifacts once at startup.
///
/// Each failed load is reported here and degrades (empty catalogue,
/// empty schema, absent predictor) so requests surface a configuration
/// failure instead of the process crashing or retrying per request.
pub(crate) fn load_advisor(data: &DataConfig) -> Arc<ProductionAdvisor> {
    let catalogue = match CardCatalogue::from_path(&data.catalogue_path) {
        Ok(catalogue) => {
            info!(
                path = %data.catalogue_path.display(),
                cards = catalogue.len(),
                "loaded card catalogue"
            );
            catalogue
        }
        Err(err) => {
            error!(
                path = %data.catalogue_path.display(),
                %err,
                "failed to load card catalogue; ranking and details will be unavailable"
            );
            CardCatalogue::empty()
        }
    };

    let schema = match InputSchema::from_path(&data.schema_path) {
        Ok(schema) => {
            info!(
                path = %data.schema_path.display(),
                columns = schema.columns().len(),
                "loaded model input schema"
            );
            schema
        }
        Err(err) => {
            error!(
                path = %data.schema_path.display(),
                %err,
                "failed to load input schema; ranking requests will fail validation"
            );
            InputSchema::empty()
        }
    };

    let predictor = match LogisticEligibilityModel::from_path(&data.model_path) {
        Ok(model) => {
            info!(path = %data.model_path.display(), "loaded eligibility model");
            Some(Arc::new(model))
        }
        Err(err) => {
            error!(
                path = %data.model_path.display(),
                %err,
                "failed to load eligibility model; ranking will be unavailable"
            );
            None
        }
    };

    Arc::new(CardAdvisor::new(
        Arc::new(catalogue),
        schema,
        predictor,
        Arc::new(FuzzyFeatureMapper::new()),
    ))
}
