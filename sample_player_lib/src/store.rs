use std::sync::Arc;

use crate::sample::Sample;

/// Holds the one currently playable sample.
///
/// The sample is replaced wholesale, never mutated; the `Arc` keeps an old
/// sample alive until every reader has dropped it. Invalidating the voices
/// that still reference a replaced sample is the job of the `Sampler`, which
/// owns this store and clears its pool in the same step.
#[derive(Clone, Debug, Default)]
pub struct SoundStore {
    sample: Option<Arc<Sample>>,
}

impl SoundStore {
    pub fn load(&mut self, sample: Arc<Sample>) {
        self.sample = Some(sample);
    }

    pub fn current(&self) -> Option<&Arc<Sample>> {
        self.sample.as_ref()
    }

    pub fn clear(&mut self) {
        self.sample = None;
    }
}
