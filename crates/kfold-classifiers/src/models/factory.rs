use crate::config::ModelType;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::random_forest::RandomForestClassifier;
use crate::models::svm::SVMClassifier;

/// Build an unfitted boxed classifier from a `ModelType`.
///
/// `seed` drives any randomness inside the model so a fold can be replayed.
pub fn build_model(model_type: &ModelType, seed: u64) -> Box<dyn ClassifierModel> {
    match model_type {
        ModelType::Svm { .. } => Box::new(SVMClassifier::new(model_type.clone())),
        ModelType::RandomForest { .. } => {
            Box::new(RandomForestClassifier::new(model_type.clone(), seed))
        }
    }
}
