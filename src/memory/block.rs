/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 记账用的 RAII 守卫：创建即分配，drop 即释放
 */

use super::Category;
use super::recorder;
use crate::tensor::Tensor;
use std::ops::Deref;
use std::panic::Location;

/// 一块被记账的内存。本身不持有数据，只负责在生命周期两端上报分配与释放
#[derive(Debug)]
pub struct MemoryBlock {
    id: u64,
    bytes: usize,
    category: Category,
}

impl MemoryBlock {
    /// 上报一次分配。调用位置会作为该块的调用点（call site）写入事件日志
    #[track_caller]
    pub fn alloc(bytes: usize, category: Category, label: &str) -> Self {
        let id = recorder::on_alloc(bytes, category, label, Location::caller());
        Self {
            id,
            bytes,
            category,
        }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn bytes(&self) -> usize {
        self.bytes
    }

    pub const fn category(&self) -> Category {
        self.category
    }
}

impl Drop for MemoryBlock {
    fn drop(&mut self) {
        recorder::on_free(self.id);
    }
}

/// 被记账的张量：张量数据与其`MemoryBlock`同生共死
#[derive(Debug)]
pub struct Tracked {
    tensor: Tensor,
    block: MemoryBlock,
}

impl Tracked {
    #[track_caller]
    pub fn new(tensor: Tensor, category: Category, label: &str) -> Self {
        let block = MemoryBlock::alloc(tensor.nbytes(), category, label);
        Self { tensor, block }
    }

    pub const fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// 原地修改张量。调用方须保证不改变元素个数，否则记账会失真；
    /// 需要换成不同大小的张量时请用[`Tracked::replace`]
    pub fn tensor_mut(&mut self) -> &mut Tensor {
        &mut self.tensor
    }

    /// 替换张量。大小不变时沿用原内存块，否则先分配新块再释放旧块
    #[track_caller]
    pub fn replace(&mut self, tensor: Tensor, label: &str) {
        if tensor.nbytes() != self.block.bytes() {
            self.block = MemoryBlock::alloc(tensor.nbytes(), self.block.category(), label);
        }
        self.tensor = tensor;
    }

    pub const fn category(&self) -> Category {
        self.block.category()
    }

    pub const fn block_id(&self) -> u64 {
        self.block.id()
    }
}

impl Deref for Tracked {
    type Target = Tensor;

    fn deref(&self) -> &Tensor {
        &self.tensor
    }
}
