use std::collections::VecDeque;

/// Source of uniform indices used to pick the next emotion.
pub trait RandomSource: Send + Sync + 'static {
    /// Returns an index in `0..upper`. `upper` is never zero.
    fn pick(&mut self, upper: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    fn pick(&mut self, upper: usize) -> usize {
        self.usize(..upper)
    }
}

/// Cycles through a fixed list of indices, wrapping each into range.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    indices: VecDeque<usize>,
}

impl SequenceSource {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
        }
    }
}

impl RandomSource for SequenceSource {
    fn pick(&mut self, upper: usize) -> usize {
        let Some(next) = self.indices.pop_front() else {
            return 0;
        };
        self.indices.push_back(next);
        next % upper
    }
}
