//! Every-Nth-frame sampling for capture loops.

/// Decides which captured frames are sent to the classifier and engine.
///
/// Frames are numbered from 1; frame `k` is sampled when `k % interval == 0`.
#[derive(Debug, Clone)]
pub struct FrameSampler {
    interval: u64,
    seen: u64,
}

impl FrameSampler {
    /// An interval of 0 is treated as 1 (every frame).
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            seen: 0,
        }
    }

    /// Count one captured frame and report whether it should be analyzed.
    pub fn tick(&mut self) -> bool {
        self.seen += 1;
        self.seen % self.interval == 0
    }

    pub fn frames_seen(&self) -> u64 {
        self.seen
    }

    pub fn interval(&self) -> u64 {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_fifth_frame() {
        let mut sampler = FrameSampler::new(5);
        let sampled: Vec<u64> = (1..=12).filter(|_| sampler.tick()).collect();
        assert_eq!(sampled, vec![5, 10]);
        assert_eq!(sampler.frames_seen(), 12);
    }

    #[test]
    fn test_zero_interval_samples_everything() {
        let mut sampler = FrameSampler::new(0);
        assert_eq!(sampler.interval(), 1);
        assert!((0..4).all(|_| sampler.tick()));
    }
}
