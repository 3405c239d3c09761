use crate::assert_err;
use crate::nn::{AdamConfig, OptimizerConfig, SgdConfig};
use crate::train::{ModelConfig, TrainConfig, TrainError};
use std::io::Write;

#[test]
fn test_partial_json_uses_defaults() {
    let config = TrainConfig::from_json_str(
        r#"{"batch_size": 2, "optimizer": {"kind": "sgd", "lr": 0.1}}"#,
    )
    .unwrap();
    assert_eq!(config.batch_size, 2);
    assert_eq!(config.seed, 42);
    assert_eq!(config.iterations, 3);
    assert_eq!(config.model, ModelConfig::default());
    assert_eq!(
        config.optimizer,
        OptimizerConfig::Sgd(SgdConfig {
            lr: 0.1,
            ..SgdConfig::default()
        })
    );
    assert_eq!(config.input_shape(), [2, 512]);
}

#[test]
fn test_invalid_config_is_rejected() {
    assert_err!(
        TrainConfig::from_json_str(r#"{"batch_size": 0}"#),
        TrainError::InvalidConfig(msg) if msg.contains("batch_size")
    );
    assert_err!(
        TrainConfig::from_json_str(r#"{"model": {"hidden": [8, 0]}}"#),
        TrainError::InvalidConfig(msg) if msg.contains("隐藏层")
    );
    let config = TrainConfig {
        optimizer: OptimizerConfig::Adam(AdamConfig {
            eps: 0.0,
            ..AdamConfig::default()
        }),
        ..TrainConfig::default()
    };
    assert_err!(
        config.validate(),
        TrainError::InvalidConfig(msg) if msg.contains("eps")
    );
    assert_err!(TrainConfig::from_json_str("{"), TrainError::Config(_));
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"seed": 7, "model": {{"input_features": 4, "hidden": [], "output_features": 2}}}}"#
    )
    .unwrap();
    let config = TrainConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.seed, 7);
    assert!(config.model.hidden.is_empty());
    assert_eq!(config.model.output_features, 2);

    let dir = tempfile::tempdir().unwrap();
    assert_err!(
        TrainConfig::from_json_file(dir.path().join("missing.json")),
        TrainError::Io(_)
    );
}
