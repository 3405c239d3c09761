use crate::memory::{
    Category, EventAction, MemoryBlock, MemorySnapshot, RecordMode, RecordingGuard, Tracked,
    is_recording, max_memory_allocated, memory_allocated, record_memory_history,
    reset_peak_memory_stats, snapshot,
};
use crate::tensor::Tensor;

// 记账状态是线程局部的，而每个#[test]各自运行在独立线程中，故用例之间互不干扰

#[test]
fn test_tracked_accounting() {
    let before = memory_allocated();
    let a = Tracked::new(Tensor::zeros(&[4, 4]), Category::Parameter, "a");
    assert_eq!(memory_allocated(), before + 64);
    {
        let _b = Tracked::new(Tensor::zeros(&[2, 2]), Category::Gradient, "b");
        assert_eq!(memory_allocated(), before + 80);
    }
    assert_eq!(memory_allocated(), before + 64);
    assert_eq!(max_memory_allocated(), before + 80);

    reset_peak_memory_stats();
    assert_eq!(max_memory_allocated(), before + 64);
    drop(a);
    assert_eq!(memory_allocated(), before);
}

#[test]
fn test_tracked_replace() {
    let mut t = Tracked::new(Tensor::zeros(&[2, 2]), Category::OptimizerState, "m");
    let block = t.block_id();
    // 同样大小：沿用原内存块
    t.replace(Tensor::ones(&[4]), "m");
    assert_eq!(t.block_id(), block);
    assert_eq!(memory_allocated(), 16);
    // 不同大小：换新块
    t.replace(Tensor::ones(&[3, 3]), "m");
    assert_ne!(t.block_id(), block);
    assert_eq!(memory_allocated(), 36);
    assert_eq!(max_memory_allocated(), 52);
    assert_eq!(t.category(), Category::OptimizerState);
    assert_eq!(t.shape(), &[3, 3]);
}

#[test]
fn test_recording_captures_ordered_events() {
    assert!(!is_recording());
    let _param = Tracked::new(Tensor::zeros(&[8]), Category::Parameter, "w");

    record_memory_history(RecordMode::All);
    assert!(is_recording());
    {
        let _grad = Tracked::new(Tensor::zeros(&[8]), Category::Gradient, "w.grad");
        let _tmp = MemoryBlock::alloc(100, Category::Temporary, "tmp");
    }
    let snap = snapshot();
    record_memory_history(RecordMode::Off);

    assert!(!snap.is_empty());
    assert!(snap.is_chronological());
    assert_eq!(snap.events.len(), 4);
    assert_eq!(snap.window_start_bytes, 32);
    assert_eq!(snap.events[0].action, EventAction::Alloc);
    assert_eq!(snap.events[0].label, "w.grad");
    assert_eq!(snap.events[0].allocated_after, 64);
    assert_eq!(snap.events[1].allocated_after, 164);
    // 局部变量按声明的逆序drop
    assert_eq!(snap.events[2].label, "tmp");
    assert_eq!(snap.events[2].action, EventAction::Free);
    assert_eq!(snap.window_peak_bytes(), 164);
    assert_eq!(snap.alloc_count(Category::Gradient), 1);
    assert!(snap.events[0].site.file.ends_with(".rs"));

    // 仍存活的块只剩参数
    assert_eq!(snap.live_blocks.len(), 1);
    assert_eq!(snap.live_blocks[0].label, "w");
}

#[test]
fn test_recording_off_keeps_log_unchanged() {
    record_memory_history(RecordMode::All);
    let a = Tracked::new(Tensor::zeros(&[2]), Category::Activation, "a");
    record_memory_history(RecordMode::Off);
    let before = snapshot();

    drop(a);
    let _b = Tracked::new(Tensor::zeros(&[2]), Category::Activation, "b");
    let after = snapshot();

    assert_eq!(before.events, after.events);
    assert_eq!(after.events.len(), 1);
    // 记账不受记录开关影响
    assert_eq!(after.allocated_bytes, 8);
}

#[test]
fn test_turning_on_starts_fresh_log() {
    record_memory_history(RecordMode::All);
    let _a = Tracked::new(Tensor::zeros(&[2]), Category::Activation, "a");
    record_memory_history(RecordMode::All);
    assert!(snapshot().is_empty());
    assert_eq!(snapshot().window_start_bytes, 8);
    record_memory_history(RecordMode::Off);
}

#[test]
fn test_bounded_recording_keeps_latest_events() {
    record_memory_history(RecordMode::Bounded(2));
    let a = Tracked::new(Tensor::zeros(&[1]), Category::Gradient, "a");
    let b = Tracked::new(Tensor::zeros(&[2]), Category::Gradient, "b");
    let c = Tracked::new(Tensor::zeros(&[3]), Category::Parameter, "c");
    let snap = snapshot();
    record_memory_history(RecordMode::Off);

    assert_eq!(snap.events.len(), 2);
    assert_eq!(snap.events[0].label, "b");
    assert_eq!(snap.events[1].label, "c");
    // 被挤出的a并入窗口起点
    assert_eq!(snap.window_start_bytes, 4);
    assert_eq!(snap.window_start_by_category.get(&Category::Gradient), Some(&4));
    assert_eq!(snap.timeline().last().map(|p| p.bytes), Some(24));
    drop((a, b, c));
}

#[test]
fn test_peak_breakdown() {
    record_memory_history(RecordMode::All);
    let p = Tracked::new(Tensor::zeros(&[10]), Category::Parameter, "p");
    {
        let _g = Tracked::new(Tensor::zeros(&[10]), Category::Gradient, "g");
        let _s = Tracked::new(Tensor::zeros(&[20]), Category::OptimizerState, "s");
    }
    let snap = snapshot();
    record_memory_history(RecordMode::Off);

    let breakdown = snap.peak_breakdown();
    assert_eq!(breakdown.get(&Category::Parameter), Some(&40));
    assert_eq!(breakdown.get(&Category::Gradient), Some(&40));
    assert_eq!(breakdown.get(&Category::OptimizerState), Some(&80));
    assert_eq!(snap.window_peak_bytes(), 160);
    drop(p);
}

#[test]
fn test_recording_guard_turns_off_on_drop() {
    {
        let _guard = RecordingGuard::start(RecordMode::All);
        assert!(is_recording());
    }
    assert!(!is_recording());
}

#[test]
fn test_dump_and_load_json_and_bincode() {
    let dir = tempfile::tempdir().unwrap();
    record_memory_history(RecordMode::All);
    let _a = Tracked::new(Tensor::zeros(&[3, 3]), Category::Activation, "a");
    let snap = snapshot();
    record_memory_history(RecordMode::Off);

    let json_path = dir.path().join("snapshot.json");
    snap.dump(&json_path).unwrap();
    assert_eq!(MemorySnapshot::load(&json_path).unwrap(), snap);
    let text = std::fs::read_to_string(&json_path).unwrap();
    assert!(text.contains("\"activation\""));

    let bin_path = dir.path().join("snapshot.pickle");
    snap.dump(&bin_path).unwrap();
    assert_eq!(MemorySnapshot::load(&bin_path).unwrap(), snap);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = MemorySnapshot::load(dir.path().join("missing.json"));
    assert!(matches!(result, Err(crate::memory::MemoryError::Io(_))));
}
