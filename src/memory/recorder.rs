/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 线程局部的记账/记录状态及对外的开关接口
 */

use super::Category;
use super::snapshot::{CallSite, EventAction, LiveBlock, MemoryEvent, MemorySnapshot};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::panic::Location;
use std::time::Instant;

/// 分配历史的记录方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordMode {
    /// 停止记录（已记录的日志保留，直到下次开启）
    #[default]
    Off,
    /// 记录所有分配/释放事件
    All,
    /// 记录所有事件，但最多保留最近的`n`条
    Bounded(usize),
}

struct RecorderState {
    allocated: usize,
    peak: usize,
    by_category: BTreeMap<Category, usize>,
    next_block_id: u64,
    live: BTreeMap<u64, LiveBlock>,

    mode: RecordMode,
    origin: Instant,
    next_seq: u64,
    /// 日志中第一条事件之前的占用（开启记录时的占用，或被挤出日志的事件累计后的占用）
    window_start_bytes: usize,
    window_start_by_category: BTreeMap<Category, usize>,
    events: VecDeque<MemoryEvent>,
}

impl RecorderState {
    fn new() -> Self {
        Self {
            allocated: 0,
            peak: 0,
            by_category: BTreeMap::new(),
            next_block_id: 1,
            live: BTreeMap::new(),
            mode: RecordMode::Off,
            origin: Instant::now(),
            next_seq: 1,
            window_start_bytes: 0,
            window_start_by_category: BTreeMap::new(),
            events: VecDeque::new(),
        }
    }

    const fn is_recording(&self) -> bool {
        !matches!(self.mode, RecordMode::Off)
    }

    fn push_event(&mut self, action: EventAction, block: &LiveBlock) {
        if !self.is_recording() {
            return;
        }
        let event = MemoryEvent {
            seq: self.next_seq,
            elapsed_us: self.origin.elapsed().as_micros() as u64,
            action,
            block: block.id,
            bytes: block.bytes,
            category: block.category,
            label: block.label.clone(),
            site: block.site.clone(),
            allocated_after: self.allocated,
        };
        self.next_seq += 1;
        self.events.push_back(event);

        if let RecordMode::Bounded(max_entries) = self.mode {
            while self.events.len() > max_entries {
                let Some(dropped) = self.events.pop_front() else {
                    break;
                };
                // 被挤出的事件并入窗口起点，保证回放时间线时起点正确
                self.window_start_bytes = dropped.allocated_after;
                let entry = self
                    .window_start_by_category
                    .entry(dropped.category)
                    .or_insert(0);
                match dropped.action {
                    EventAction::Alloc => *entry += dropped.bytes,
                    EventAction::Free => *entry = entry.saturating_sub(dropped.bytes),
                }
            }
        }
    }
}

thread_local! {
    static STATE: RefCell<RecorderState> = RefCell::new(RecorderState::new());
}

pub(super) fn on_alloc(
    bytes: usize,
    category: Category,
    label: &str,
    location: &'static Location<'static>,
) -> u64 {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        let id = state.next_block_id;
        state.next_block_id += 1;

        state.allocated += bytes;
        state.peak = state.peak.max(state.allocated);
        *state.by_category.entry(category).or_insert(0) += bytes;

        let block = LiveBlock {
            id,
            bytes,
            category,
            label: label.to_string(),
            site: CallSite::from(location),
        };
        state.push_event(EventAction::Alloc, &block);
        state.live.insert(id, block);
        id
    })
}

pub(super) fn on_free(id: u64) {
    // 线程退出时thread_local可能已被销毁，此时无需再记账
    let _ = STATE.try_with(|state| {
        let mut state = state.borrow_mut();
        let Some(block) = state.live.remove(&id) else {
            return;
        };
        state.allocated = state.allocated.saturating_sub(block.bytes);
        if let Some(bytes) = state.by_category.get_mut(&block.category) {
            *bytes = bytes.saturating_sub(block.bytes);
        }
        state.push_event(EventAction::Free, &block);
    });
}

/// 开启或关闭当前线程的分配历史记录。
///
/// 开启时会清空旧日志并以当前占用作为窗口起点；关闭后不再追加事件，
/// 已有日志保持不变，仍可通过[`snapshot`]取出。
pub fn record_memory_history(mode: RecordMode) {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        if !matches!(mode, RecordMode::Off) {
            state.events.clear();
            state.origin = Instant::now();
            state.window_start_bytes = state.allocated;
            state.window_start_by_category = state.by_category.clone();
        }
        state.mode = mode;
        tracing::debug!(
            "内存分配历史记录切换为{mode:?}，当前占用{}字节",
            state.allocated
        );
    });
}

/// 当前线程是否正在记录分配历史
pub fn is_recording() -> bool {
    STATE.with(|state| state.borrow().is_recording())
}

/// 当前被记账的字节数
pub fn memory_allocated() -> usize {
    STATE.with(|state| state.borrow().allocated)
}

/// 自线程开始（或上次[`reset_peak_memory_stats`]）以来的峰值字节数
pub fn max_memory_allocated() -> usize {
    STATE.with(|state| state.borrow().peak)
}

/// 把峰值重置为当前占用
pub fn reset_peak_memory_stats() {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.peak = state.allocated;
    });
}

/// 抽取当前日志及仍存活的内存块，生成一份快照。不影响记录状态
pub fn snapshot() -> MemorySnapshot {
    STATE.with(|state| {
        let state = state.borrow();
        MemorySnapshot {
            window_start_bytes: state.window_start_bytes,
            window_start_by_category: state.window_start_by_category.clone(),
            events: state.events.iter().cloned().collect(),
            live_blocks: state.live.values().cloned().collect(),
            allocated_bytes: state.allocated,
            max_allocated_bytes: state.peak,
        }
    })
}

/// 作用域内开启记录，离开作用域（包括出错提前返回）时自动关闭
#[derive(Debug)]
pub struct RecordingGuard {
    _private: (),
}

impl RecordingGuard {
    pub fn start(mode: RecordMode) -> Self {
        record_memory_history(mode);
        Self { _private: () }
    }
}

impl Drop for RecordingGuard {
    fn drop(&mut self) {
        record_memory_history(RecordMode::Off);
    }
}
