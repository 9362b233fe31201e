use std::time::Instant;

/// Loudness summary of one audio block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessSample {
    pub average_abs_amplitude: f64,
    pub captured_at: Instant,
    pub block_length: usize,
}

/// Mean absolute amplitude of `block`.
///
/// This is a coarse loudness proxy, not true RMS. An empty block reports an
/// amplitude of zero instead of dividing by zero. Non-finite samples count as
/// silence.
pub fn estimate(block: &[f32], captured_at: Instant) -> LoudnessSample {
    let block_length = block.len();
    let average_abs_amplitude = if block_length == 0 {
        0.0
    } else {
        let total: f64 = block
            .iter()
            .filter(|sample| sample.is_finite())
            .map(|sample| f64::from(sample.abs()))
            .sum();
        total / block_length as f64
    };
    LoudnessSample {
        average_abs_amplitude,
        captured_at,
        block_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_block_reports_zero() {
        let sample = estimate(&[], Instant::now());
        assert_eq!(sample.average_abs_amplitude, 0.0);
        assert_eq!(sample.block_length, 0);
    }

    #[test]
    fn averages_absolute_values() {
        let sample = estimate(&[0.25, -0.75, 0.0, -0.5], Instant::now());
        assert!((sample.average_abs_amplitude - 0.375).abs() < 1e-9);
        assert_eq!(sample.block_length, 4);
    }

    #[test]
    fn amplitude_is_never_negative() {
        let blocks: [&[f32]; 4] = [
            &[-1.0, -1.0, -1.0],
            &[-0.001],
            &[0.0, -0.0],
            &[f32::MIN_POSITIVE, -f32::MIN_POSITIVE],
        ];
        for block in blocks {
            assert!(estimate(block, Instant::now()).average_abs_amplitude >= 0.0);
        }
    }

    #[test]
    fn non_finite_samples_count_as_silence() {
        let sample = estimate(&[f32::NAN, 0.5, f32::INFINITY, -0.5], Instant::now());
        assert_eq!(sample.average_abs_amplitude, 0.25);
        assert_eq!(sample.block_length, 4);
    }
}
