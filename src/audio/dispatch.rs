use crossbeam_channel::{Sender, TrySendError};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Re-chunks callback slices into fixed-length blocks and hands them to the
/// relay loop without blocking the audio thread.
pub(super) struct FrameDispatcher {
    block_samples: usize,
    pending: Vec<f32>,
    sender: Sender<Vec<f32>>,
    dropped: Arc<AtomicUsize>,
    disconnected: bool,
}

impl FrameDispatcher {
    pub(super) fn new(
        block_samples: usize,
        sender: Sender<Vec<f32>>,
        dropped: Arc<AtomicUsize>,
    ) -> Self {
        let block_samples = block_samples.max(1);
        Self {
            block_samples,
            pending: Vec::with_capacity(block_samples),
            sender,
            dropped,
            disconnected: false,
        }
    }

    /// Convert and append `data`, emitting every complete block. Interleaved
    /// channels stay interleaved.
    pub(super) fn push<T, F>(&mut self, data: &[T], convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        if self.disconnected {
            return;
        }
        self.pending.extend(data.iter().copied().map(convert));

        while self.pending.len() >= self.block_samples {
            let block: Vec<f32> = self.pending.drain(..self.block_samples).collect();
            if let Err(err) = self.sender.try_send(block) {
                match err {
                    TrySendError::Full(_) => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                    }
                    TrySendError::Disconnected(_) => {
                        self.disconnected = true;
                        self.pending.clear();
                        break;
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub(super) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

pub(super) fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / 32_768.0
}

pub(super) fn u16_to_f32(sample: u16) -> f32 {
    (sample as f32 - 32_768.0) / 32_768.0
}
