//! Integration tests for the mlcore library
//!
//! These tests verify end-to-end functionality across modules: dataset
//! partitioning into the pipeline, observer streams during training and
//! test, metrics, and model persistence.

use mlcore::observer::CollectingObserver;
use mlcore::{
    load_csv, EvaluationPipeline, KMeansClusterer, LabeledDataset, LabeledSample, LmsRegressor,
    MajorityClassifier, Model, ModelError, NearestCentroidClassifier, SharedObserver,
    TestInstanceResult, TrainingResult,
};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 100 samples, two classes split 50/50, feature 1 encodes the class
fn balanced_dataset() -> LabeledDataset {
    let mut samples = Vec::new();
    for i in 0..50 {
        samples.push(LabeledSample::new(vec![i as f64, 0.0], 0));
        samples.push(LabeledSample::new(vec![i as f64, 1.0], 1));
    }
    LabeledDataset::from_samples(samples).unwrap()
}

/// The pinned-numbers example: partition 80% of a balanced two-class
/// dataset, train the deterministic majority model, and check the exact
/// confusion matrix and metrics.
#[test]
fn test_balanced_partition_with_majority_model() {
    let dataset = balanced_dataset();
    let (training_set, test_set) = dataset.partition(80.0, 42).unwrap();

    assert_eq!(training_set.len(), 80);
    assert_eq!(test_set.len(), 20);
    assert_eq!(training_set.class_counts()[&0], 40);
    assert_eq!(training_set.class_counts()[&1], 40);
    assert_eq!(test_set.class_counts()[&0], 10);
    assert_eq!(test_set.class_counts()[&1], 10);

    let mut pipeline = EvaluationPipeline::new(Box::new(MajorityClassifier::new()));
    pipeline.train(&training_set).unwrap();
    pipeline.test(&test_set).unwrap();

    // 40/40 training tie breaks toward label 0, so everything is
    // predicted 0: row sums 10 and 10, accuracy exactly one half
    let matrix = pipeline.confusion_matrix();
    assert_eq!(matrix.total(), 20);
    assert_eq!(matrix.counts()[0][0], 10);
    assert_eq!(matrix.counts()[0][1], 0);
    assert_eq!(matrix.counts()[1][0], 10);
    assert_eq!(matrix.counts()[1][1], 0);

    assert_eq!(pipeline.test_accuracy(), 0.5);
    assert_eq!(pipeline.test_precision(0).unwrap(), 0.5);
    assert_eq!(pipeline.test_recall(0).unwrap(), 1.0);
    assert_eq!(pipeline.test_recall(1).unwrap(), 0.0);
    assert_eq!(pipeline.test_f_measure(1).unwrap(), 0.0);

    // F-measure for class 0: harmonic mean of 0.5 and 1.0
    let f0 = pipeline.test_f_measure(0).unwrap();
    assert!((f0 - 2.0 / 3.0).abs() < 1e-12);
}

/// Observers registered on the model see the training stream live and
/// the test stream sample-by-sample.
#[test]
fn test_observer_streams_end_to_end() {
    let dataset = balanced_dataset();
    let (training_set, test_set) = dataset.partition(80.0, 7).unwrap();

    let training_obs = Arc::new(Mutex::new(CollectingObserver::<TrainingResult>::new()));
    let test_obs = Arc::new(Mutex::new(CollectingObserver::<TestInstanceResult>::new()));

    let model = KMeansClusterer::new(2).with_seed(7);
    model
        .base()
        .register_training_observer(training_obs.clone() as SharedObserver<TrainingResult>)
        .unwrap();
    model
        .base()
        .register_test_observer(test_obs.clone() as SharedObserver<TestInstanceResult>)
        .unwrap();

    let mut pipeline = EvaluationPipeline::new(Box::new(model));
    pipeline.train(&training_set).unwrap();

    let streamed = training_obs.lock().unwrap().records().to_vec();
    assert_eq!(
        streamed.len(),
        pipeline.model().num_training_iterations_to_converge()
    );
    assert_eq!(streamed.as_slice(), pipeline.model().training_results());

    pipeline.test(&test_set).unwrap();
    let outcomes = test_obs.lock().unwrap().records().to_vec();
    assert_eq!(outcomes.len(), test_set.len());
    // Indices arrive in evaluation order
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.sample_index, i);
    }
    // The pipeline's retained results are the same stream
    assert_eq!(outcomes.as_slice(), pipeline.test_results());
}

/// A centroid model separates well-separated classes almost perfectly
/// through the full CSV -> partition -> train -> test path.
#[test]
fn test_complete_workflow_csv() {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(temp_file, "f1,f2,label").expect("Failed to write");
    for i in 0..20 {
        writeln!(temp_file, "{}.0,{}.0,0", i, i % 3).expect("Failed to write");
        writeln!(temp_file, "{}.0,{}.0,1", i + 100, i % 3).expect("Failed to write");
    }
    temp_file.flush().expect("Failed to flush");

    let dataset = load_csv(temp_file.path()).expect("CSV loading should succeed");
    assert_eq!(dataset.len(), 40);
    assert_eq!(dataset.dim(), 2);

    let (training_set, test_set) = dataset.partition(75.0, 3).unwrap();

    let mut pipeline = EvaluationPipeline::new(Box::new(NearestCentroidClassifier::new()));
    pipeline.train(&training_set).unwrap();
    pipeline.test(&test_set).unwrap();

    // The classes are 100 apart on feature 1; nothing should miss
    assert_eq!(pipeline.test_accuracy(), 1.0);
    assert_eq!(
        pipeline.confusion_matrix().total() as usize,
        test_set.len()
    );
}

/// Scaling enabled: same workflow still classifies correctly using
/// ranges learned at training time.
#[test]
fn test_workflow_with_scaling() {
    let dataset = balanced_dataset();
    let (training_set, test_set) = dataset.partition(80.0, 5).unwrap();

    let mut model = NearestCentroidClassifier::new();
    model.enable_scaling(true);

    let mut pipeline = EvaluationPipeline::new(Box::new(model));
    pipeline.train(&training_set).unwrap();
    pipeline.test(&test_set).unwrap();

    // Feature 2 encodes the class exactly, scaling preserves that
    assert_eq!(pipeline.test_accuracy(), 1.0);
}

/// Persistence: a trained model saved, reloaded, and driven through a
/// fresh pipeline produces identical metrics.
#[test]
fn test_saved_model_evaluates_identically() {
    let dataset = balanced_dataset();
    let (training_set, test_set) = dataset.partition(80.0, 13).unwrap();

    let mut model = NearestCentroidClassifier::new();
    model.train(&training_set).unwrap();

    let temp = NamedTempFile::new().expect("Failed to create temp file");
    model.save_model(temp.path()).unwrap();

    let mut pipeline_a = EvaluationPipeline::new(Box::new(model));
    pipeline_a.test(&test_set).unwrap();

    let mut restored = NearestCentroidClassifier::new();
    restored.load_model(temp.path()).unwrap();
    let mut pipeline_b = EvaluationPipeline::new(Box::new(restored));
    pipeline_b.test(&test_set).unwrap();

    assert_eq!(pipeline_a.test_accuracy(), pipeline_b.test_accuracy());
    assert_eq!(
        pipeline_a.confusion_matrix().counts(),
        pipeline_b.confusion_matrix().counts()
    );
}

/// The regressor family supports map but not predict, so it cannot be
/// driven through the classification test harness.
#[test]
fn test_regressor_in_pipeline_is_capability_mismatch() {
    let dataset = balanced_dataset();
    let (training_set, test_set) = dataset.partition(80.0, 1).unwrap();

    let mut pipeline = EvaluationPipeline::new(Box::new(LmsRegressor::new()));
    pipeline.train(&training_set).unwrap();

    assert!(matches!(
        pipeline.test(&test_set).unwrap_err(),
        ModelError::Unsupported("test")
    ));

    // map still works on the trained model
    let out = pipeline.model_mut().map(&[10.0, 0.0]).unwrap();
    assert_eq!(out.len(), 1);
}

/// Failed operations leave prior state unchanged across the lifecycle.
#[test]
fn test_lifecycle_state_machine() {
    let mut model = MajorityClassifier::new();
    let dataset = balanced_dataset();

    // UNTRAINED: predict refuses to compute
    assert!(matches!(
        model.predict(&[0.0, 0.0]).unwrap_err(),
        ModelError::NotTrained
    ));

    // UNTRAINED -> TRAINED
    model.train(&dataset).unwrap();
    assert!(model.trained());
    assert_eq!(model.num_input_dimensions(), 2);

    // Failed retrain keeps TRAINED state
    assert!(model.train(&LabeledDataset::new()).is_err());
    assert!(model.trained());

    // reset keeps the state label and the learned parameters
    model.reset().unwrap();
    assert!(model.trained());
    assert_eq!(model.num_input_dimensions(), 2);

    // TRAINED -> UNTRAINED via clear
    model.clear().unwrap();
    assert!(!model.trained());
    assert_eq!(model.num_input_dimensions(), 0);
    assert_eq!(model.num_training_iterations_to_converge(), 0);
}

/// removeAll on one channel leaves the other channel's observers alone.
#[test]
fn test_channel_removal_independence() {
    let model = MajorityClassifier::new();
    let training_obs = Arc::new(Mutex::new(CollectingObserver::<TrainingResult>::new()));
    let test_obs = Arc::new(Mutex::new(CollectingObserver::<TestInstanceResult>::new()));

    model
        .base()
        .register_training_observer(training_obs.clone() as SharedObserver<TrainingResult>)
        .unwrap();
    model
        .base()
        .register_test_observer(test_obs.clone() as SharedObserver<TestInstanceResult>)
        .unwrap();

    model.base().remove_all_training_observers().unwrap();

    let mut boxed: Box<dyn Model> = Box::new(model);
    boxed.train(&balanced_dataset()).unwrap();
    assert!(training_obs.lock().unwrap().records().is_empty());

    let result = TestInstanceResult::new(0, 0, 0, vec![1.0]);
    boxed.base().notify_test_observers(&result).unwrap();
    assert_eq!(test_obs.lock().unwrap().records().len(), 1);
}
