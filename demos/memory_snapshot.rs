//! 对比常规训练与“更新合并进反向传播”的内存占用，并导出两份快照
//!
//! ```text
//! cargo run --example memory_snapshot [config.json] [输出目录]
//! RUST_LOG=debug cargo run --example memory_snapshot
//! ```

use std::path::PathBuf;

use step_in_backward::memory::Category;
use step_in_backward::train::{TrainConfig, TrainError, compare};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), TrainError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => TrainConfig::from_json_file(path)?,
        None => TrainConfig::default(),
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    tracing::info!("训练配置：{config:?}");

    let comparison = compare(&config)?;

    for (file, report) in [
        ("snapshot.json", &comparison.baseline),
        ("snapshot-opt-in-bwd.json", &comparison.fused),
    ] {
        let path = out_dir.join(file);
        report.snapshot.dump(&path)?;
        let breakdown = report.snapshot.peak_breakdown();
        let bytes_of = |category: Category| breakdown.get(&category).copied().unwrap_or(0);
        tracing::info!(
            "{}：{}个事件，窗口峰值{}字节（参数{}，梯度{}，优化器状态{}，临时张量{}），最终损失{:?}",
            path.display(),
            report.snapshot.events.len(),
            report.window_peak_bytes(),
            bytes_of(Category::Parameter),
            bytes_of(Category::Gradient),
            bytes_of(Category::OptimizerState),
            bytes_of(Category::Temporary),
            report.final_loss(),
        );
    }
    tracing::info!("峰值共减少{}字节", comparison.saved_bytes());
    Ok(())
}
