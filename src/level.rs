//! Perceptual volume level from a block of raw PCM samples.

/// Volume level sent to the receiver, always in `0..=MAX_LEVEL`.
pub type Level = u8;

pub const MAX_LEVEL: Level = 100;

/// Full-scale amplitude of a signed 16-bit sample.
const FULL_SCALE: f64 = 32768.0;

/// Normalized RMS is doubled, then mapped to percent.
const GAIN: f64 = 2.0 * 100.0;

/// Compute `min(100, floor(200 * rms / 32768))` over `block`.
///
/// Samples are widened to `f64` before squaring so the accumulation cannot
/// overflow. An empty block, or any result that is not a finite number,
/// yields 0: the monitoring loop never sees an error from here.
pub fn level_of(block: &[i16]) -> Level {
    if block.is_empty() {
        return 0;
    }

    let sum_squares: f64 = block
        .iter()
        .map(|&s| {
            let s = f64::from(s);
            s * s
        })
        .sum();
    let rms = (sum_squares / block.len() as f64).sqrt();

    let scaled = (GAIN * rms / FULL_SCALE).floor();
    if !scaled.is_finite() {
        log::warn!("Level computation produced {}, using 0", scaled);
        return 0;
    }

    scaled.min(f64::from(MAX_LEVEL)) as Level
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BLOCK: usize = 256;

    #[test]
    fn silence_is_zero() {
        assert_eq!(level_of(&[0i16; BLOCK]), 0);
    }

    #[test]
    fn empty_block_is_zero() {
        assert_eq!(level_of(&[]), 0);
    }

    #[test]
    fn alternating_full_scale_clamps_to_max() {
        let block: Vec<i16> = (0..BLOCK)
            .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
            .collect();
        assert_eq!(level_of(&block), MAX_LEVEL);
    }

    #[test]
    fn constant_max_clamps_to_max() {
        assert_eq!(level_of(&[i16::MAX; BLOCK]), MAX_LEVEL);
        assert_eq!(level_of(&[i16::MIN; BLOCK]), MAX_LEVEL);
    }

    #[test]
    fn half_scale_reaches_max_exactly() {
        // 200 * 16384 / 32768 == 100
        assert_eq!(level_of(&[16384; BLOCK]), 100);
        assert_eq!(level_of(&[16383; BLOCK]), 99);
    }

    #[test]
    fn floors_instead_of_rounding() {
        // 200 * 1638 / 32768 = 9.997...
        assert_eq!(level_of(&[1638; BLOCK]), 9);
        // 200 * 1639 / 32768 = 10.003...
        assert_eq!(level_of(&[1639; BLOCK]), 10);
    }

    #[test]
    fn sign_does_not_matter() {
        let positive = [4000i16; BLOCK];
        let negative = [-4000i16; BLOCK];
        assert_eq!(level_of(&positive), level_of(&negative));
    }

    #[test]
    fn rms_uses_the_whole_block() {
        // Half the block at 8192, half silent: rms = 8192 / sqrt(2)
        let mut block = [0i16; BLOCK];
        block[..BLOCK / 2].fill(8192);
        assert_eq!(level_of(&block), 35);
    }

    proptest! {
        #[test]
        fn level_stays_in_range(block in proptest::collection::vec(any::<i16>(), 0..1024)) {
            prop_assert!(level_of(&block) <= MAX_LEVEL);
        }

        #[test]
        fn level_is_deterministic(block in proptest::collection::vec(any::<i16>(), 1..512)) {
            prop_assert_eq!(level_of(&block), level_of(&block));
        }

        #[test]
        fn constant_block_matches_formula(sample in any::<i16>()) {
            let expected = (200.0 * f64::from(sample).abs() / 32768.0).floor().min(100.0) as Level;
            prop_assert_eq!(level_of(&[sample; BLOCK]), expected);
        }
    }
}
