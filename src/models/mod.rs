//! Concrete model families implementing the lifecycle contract
//!
//! These are deliberately simple algorithms; they exist to exercise the
//! full contract end to end (training progress streaming, scaling,
//! persistence, evaluation) and to give the CLI something to run.

pub mod centroid;
pub mod kmeans;
pub mod lms;
pub mod majority;

pub use self::centroid::NearestCentroidClassifier;
pub use self::kmeans::KMeansClusterer;
pub use self::lms::LmsRegressor;
pub use self::majority::MajorityClassifier;
