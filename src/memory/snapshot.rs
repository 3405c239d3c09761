/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 内存快照：事件日志 + 存活块 + 统计，支持序列化到文件（JSON 或 bincode）
 */

use super::{Category, MemoryError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::panic::Location;
use std::path::Path;

/// 分配发生的源码位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Alloc,
    Free,
}

/// 日志中的一条分配/释放事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEvent {
    /// 单调递增的序号
    pub seq: u64,
    /// 自开启记录以来经过的微秒数
    pub elapsed_us: u64,
    pub action: EventAction,
    pub block: u64,
    pub bytes: usize,
    pub category: Category,
    pub label: String,
    /// 分配该块的调用位置（释放事件同样指向分配处）
    pub site: CallSite,
    /// 本事件发生后的总占用
    pub allocated_after: usize,
}

/// 快照抽取时仍然存活的内存块
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveBlock {
    pub id: u64,
    pub bytes: usize,
    pub category: Category,
    pub label: String,
    pub site: CallSite,
}

/// 时间线上的一个点：某条事件之后的总占用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub seq: u64,
    pub elapsed_us: u64,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    /// 日志第一条事件之前的总占用
    pub window_start_bytes: usize,
    pub window_start_by_category: BTreeMap<Category, usize>,
    pub events: Vec<MemoryEvent>,
    pub live_blocks: Vec<LiveBlock>,
    /// 抽取快照时的总占用
    pub allocated_bytes: usize,
    /// 抽取快照时的历史峰值（含记录窗口之外）
    pub max_allocated_bytes: usize,
}

impl MemorySnapshot {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 日志是否按时间先后排列（序号严格递增，时间戳不递减）
    pub fn is_chronological(&self) -> bool {
        self.events
            .windows(2)
            .all(|pair| pair[0].seq < pair[1].seq && pair[0].elapsed_us <= pair[1].elapsed_us)
    }

    /// 回放日志得到的占用时间线，第一个点为窗口起点（seq = 0）
    pub fn timeline(&self) -> Vec<TimelinePoint> {
        let start = TimelinePoint {
            seq: 0,
            elapsed_us: 0,
            bytes: self.window_start_bytes,
        };
        std::iter::once(start)
            .chain(self.events.iter().map(|event| TimelinePoint {
                seq: event.seq,
                elapsed_us: event.elapsed_us,
                bytes: event.allocated_after,
            }))
            .collect()
    }

    /// 记录窗口内的峰值占用
    pub fn window_peak_bytes(&self) -> usize {
        self.events
            .iter()
            .map(|event| event.allocated_after)
            .fold(self.window_start_bytes, usize::max)
    }

    /// 记录窗口内峰值时刻各类别的占用
    pub fn peak_breakdown(&self) -> BTreeMap<Category, usize> {
        let mut current = self.window_start_by_category.clone();
        let mut best = current.clone();
        let mut peak = self.window_start_bytes;
        for event in &self.events {
            let entry = current.entry(event.category).or_insert(0);
            match event.action {
                EventAction::Alloc => *entry += event.bytes,
                EventAction::Free => *entry = entry.saturating_sub(event.bytes),
            }
            if event.allocated_after > peak {
                peak = event.allocated_after;
                best = current.clone();
            }
        }
        best.retain(|_, bytes| *bytes > 0);
        best
    }

    /// 指定类别的分配事件个数
    pub fn alloc_count(&self, category: Category) -> usize {
        self.events
            .iter()
            .filter(|e| e.action == EventAction::Alloc && e.category == category)
            .count()
    }

    /// 写入文件：扩展名为`json`时写JSON，否则写bincode
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<(), MemoryError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        if is_json(path) {
            serde_json::to_writer(&mut writer, self)?;
        } else {
            bincode::serialize_into(&mut writer, self)?;
        }
        writer.flush()?;
        tracing::info!(
            "内存快照已写入{}（{}条事件，窗口峰值{}字节）",
            path.display(),
            self.events.len(),
            self.window_peak_bytes()
        );
        Ok(())
    }

    /// 从文件读取，格式判断规则同[`MemorySnapshot::dump`]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        if is_json(path) {
            Ok(serde_json::from_reader(reader)?)
        } else {
            Ok(bincode::deserialize_from(reader)?)
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
