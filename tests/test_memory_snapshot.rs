/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 内存快照的抽取、开关语义与文件读写
 */

use step_in_backward::memory::{
    self, Category, EventAction, MemorySnapshot, RecordMode, Tracked,
};
use step_in_backward::nn::OptimizerConfig;
use step_in_backward::tensor::Tensor;
use step_in_backward::train::{ModelConfig, TrainConfig, compare};

#[test]
fn test_log_unchanged_after_recording_off() {
    memory::record_memory_history(RecordMode::All);
    let a = Tracked::new(Tensor::zeros(&[8, 8]), Category::Activation, "a");
    let recorded = memory::snapshot();
    assert!(!recorded.is_empty());
    assert!(recorded.is_chronological());

    memory::record_memory_history(RecordMode::Off);
    let b = Tracked::new(Tensor::zeros(&[8, 8]), Category::Activation, "b");
    drop((a, b));
    assert_eq!(memory::snapshot().events, recorded.events);
}

#[test]
fn test_snapshot_files_round_trip() {
    let config = TrainConfig {
        batch_size: 1,
        iterations: 2,
        model: ModelConfig {
            input_features: 16,
            hidden: vec![16],
            output_features: 4,
        },
        optimizer: OptimizerConfig::default(),
        ..TrainConfig::default()
    };
    let comparison = compare(&config).unwrap();
    let dir = tempfile::tempdir().unwrap();

    for (name, snapshot) in [
        ("snapshot.json", &comparison.baseline.snapshot),
        ("snapshot-opt-in-bwd.pickle", &comparison.fused.snapshot),
    ] {
        let path = dir.path().join(name);
        snapshot.dump(&path).unwrap();
        let loaded = MemorySnapshot::load(&path).unwrap();
        assert_eq!(&loaded, snapshot);
        assert!(loaded.is_chronological());
        assert_eq!(loaded.window_peak_bytes(), snapshot.window_peak_bytes());
    }

    // 每条释放事件都对应窗口内或窗口前的一次分配
    let snapshot = &comparison.fused.snapshot;
    let allocs = snapshot
        .events
        .iter()
        .filter(|e| e.action == EventAction::Alloc)
        .count();
    assert!(allocs > 0);
    let timeline = snapshot.timeline();
    assert_eq!(timeline.len(), snapshot.events.len() + 1);
    assert_eq!(timeline[0].bytes, snapshot.window_start_bytes);
}
