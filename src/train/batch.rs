use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// 批次数据来源
pub trait BatchSource {
    fn next_batch(&mut self) -> Tensor;
}

/// 由种子确定的假数据：每个元素均匀分布于[0, 1)
#[derive(Debug, Clone)]
pub struct RandomBatches {
    rng: StdRng,
    shape: Vec<usize>,
}

impl RandomBatches {
    pub fn new(seed: u64, shape: &[usize]) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            shape: shape.to_vec(),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

impl BatchSource for RandomBatches {
    fn next_batch(&mut self) -> Tensor {
        Tensor::uniform_with_rng(0.0, 1.0, &self.shape, &mut self.rng)
    }
}
