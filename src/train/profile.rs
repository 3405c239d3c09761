/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 分析窗口：在若干次迭代期间记录分配历史并取出快照
 */

use super::{BatchSource, RandomBatches, Session, TrainConfig, TrainError};
use super::{fused_train_step, train_step};
use crate::memory::{self, MemorySnapshot, RecordMode, RecordingGuard};
use crate::nn::{Optimizer, OptimizerDict};
use std::rc::Rc;

/// 一个分析窗口的结果
#[derive(Debug, Clone)]
pub struct RunReport {
    /// 每次迭代的损失
    pub losses: Vec<f32>,
    pub snapshot: MemorySnapshot,
}

impl RunReport {
    /// 窗口内的峰值占用（字节）
    pub fn window_peak_bytes(&self) -> usize {
        self.snapshot.window_peak_bytes()
    }

    pub fn final_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }
}

/// 同一模型上两种训练循环的对比
#[derive(Debug, Clone)]
pub struct Comparison {
    pub baseline: RunReport,
    pub fused: RunReport,
}

impl Comparison {
    /// 合并更新后峰值减少的字节数（没有减少时为 0）
    pub fn saved_bytes(&self) -> usize {
        self.baseline
            .window_peak_bytes()
            .saturating_sub(self.fused.window_peak_bytes())
    }
}

/// 开启分配历史记录，执行`iterations`次`step`，取出快照后关闭记录。
/// `step`出错时记录同样会被关闭
pub fn profile<F>(iterations: usize, mut step: F) -> Result<RunReport, TrainError>
where
    F: FnMut(usize) -> Result<f32, TrainError>,
{
    let guard = RecordingGuard::start(RecordMode::All);
    let mut losses = Vec::with_capacity(iterations);
    for i in 0..iterations {
        let loss = step(i)?;
        tracing::debug!("第{}次迭代，损失{loss}", i + 1);
        losses.push(loss);
    }
    let snapshot = memory::snapshot();
    drop(guard);
    Ok(RunReport { losses, snapshot })
}

/// 在分析窗口内跑常规训练循环
pub fn run_baseline(
    session: &Session,
    optimizer: &mut dyn Optimizer,
    batches: &mut dyn BatchSource,
    iterations: usize,
) -> Result<RunReport, TrainError> {
    profile(iterations, |_| {
        let batch = batches.next_batch();
        train_step(session, &mut *optimizer, &batch)
    })
}

/// 在分析窗口内跑合并更新的训练循环。窗口结束后注销本次登记的钩子
pub fn run_fused(
    session: &Session,
    dict: &Rc<OptimizerDict>,
    batches: &mut dyn BatchSource,
    iterations: usize,
) -> Result<RunReport, TrainError> {
    let handles = dict.register_hooks()?;
    let report = profile(iterations, |_| {
        let batch = batches.next_batch();
        fused_train_step(session, &batch)
    });
    for handle in handles {
        handle.remove();
    }
    report
}

/// 在同一个模型上先跑常规循环，丢弃其优化器后再跑合并更新的循环
pub fn compare(config: &TrainConfig) -> Result<Comparison, TrainError> {
    let session = Session::new(config)?;
    let params = session.parameters();
    let mut batches = RandomBatches::new(config.seed, &config.input_shape());

    let baseline = {
        let mut optimizer = config.optimizer.build(session.graph(), &params)?;
        run_baseline(&session, optimizer.as_mut(), &mut batches, config.iterations)?
    };
    tracing::info!(
        "常规训练：{}次迭代，窗口峰值{}字节",
        config.iterations,
        baseline.window_peak_bytes()
    );

    // 旧优化器的状态已释放，峰值从当前占用重新计
    memory::reset_peak_memory_stats();
    let dict = Rc::new(config.optimizer.build_dict(session.graph(), &params)?);
    let fused = run_fused(&session, &dict, &mut batches, config.iterations)?;
    tracing::info!(
        "更新合并进反向传播：{}次迭代，窗口峰值{}字节",
        config.iterations,
        fused.window_peak_bytes()
    );

    Ok(Comparison { baseline, fused })
}
