pub mod classifier_trait;
pub mod factory;
pub mod random_forest;
pub mod svm;
