//! PCM post-processing between the decoder and the I2S output
//!
//! Samples leave the MP3 decoder as interleaved `f32` in -1.0..=1.0 and
//! reach the amplifier as packed 16-bit stereo words.

use crate::config::MAX_VOLUME;

/// Volume curve, applied as `sample * VOLUME_TABLE[level] >> 6`
pub const VOLUME_TABLE: [u8; MAX_VOLUME as usize + 1] = [
    0, 1, 2, 3, 4, 6, 8, 10, 12, 14, 17, 20, 23, 27, 30, 34, 38, 43, 48, 52, 58, 64,
];

/// Playback volume level, 0..=21
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Volume(u8);

impl Volume {
    /// Create a volume, clamping to the highest level
    pub fn new(level: u8) -> Self {
        Self(level.min(MAX_VOLUME))
    }

    /// Volume level
    pub fn level(self) -> u8 {
        self.0
    }

    /// Scale one sample
    pub fn apply(self, sample: i16) -> i16 {
        let factor = i32::from(VOLUME_TABLE[usize::from(self.0)]);
        ((i32::from(sample) * factor) >> 6) as i16
    }
}

/// Convert a decoder sample to 16-bit PCM
pub fn sample_from_f32(sample: f32) -> i16 {
    // `as` saturates and maps NaN to 0
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Average of two channels
pub fn mix_mono(left: i16, right: i16) -> i16 {
    ((i32::from(left) + i32::from(right)) >> 1) as i16
}

/// Pack a stereo pair into one I2S word, left channel in the low half
pub fn i2s_word(left: i16, right: i16) -> u32 {
    u32::from(left as u16) | (u32::from(right as u16) << 16)
}

/// Turn decoded samples into I2S words
///
/// `samples` holds `frames * channels` interleaved values; `channels` is
/// 1 or 2. Returns the number of words written, bounded by `out.len()`.
pub fn render(
    samples: &[f32],
    channels: usize,
    mono: bool,
    volume: Volume,
    out: &mut [u32],
) -> usize {
    let channels = channels.clamp(1, 2);
    let mut written = 0;

    for (frame, word) in samples.chunks_exact(channels).zip(out.iter_mut()) {
        let left = sample_from_f32(frame[0]);
        let right = frame.get(1).map_or(left, |&r| sample_from_f32(r));

        let (left, right) = if mono {
            let m = mix_mono(left, right);
            (m, m)
        } else {
            (left, right)
        };

        *word = i2s_word(volume.apply(left), volume.apply(right));
        written += 1;
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamps() {
        assert_eq!(Volume::new(40).level(), 21);
        assert_eq!(Volume::new(16).level(), 16);
    }

    #[test]
    fn test_volume_curve() {
        assert_eq!(Volume::new(21).apply(1000), 1000);
        assert_eq!(Volume::new(0).apply(1000), 0);
        // Default level 16 is 38/64
        assert_eq!(Volume::new(16).apply(6400), 3800);
        assert_eq!(Volume::new(16).apply(-6400), -3800);
        assert_eq!(Volume::new(21).apply(i16::MIN), i16::MIN);
    }

    #[test]
    fn test_volume_table_rises() {
        assert!(VOLUME_TABLE.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_sample_conversion() {
        assert_eq!(sample_from_f32(0.0), 0);
        assert_eq!(sample_from_f32(1.0), 32767);
        assert_eq!(sample_from_f32(-1.0), -32767);
        assert_eq!(sample_from_f32(3.5), 32767);
        assert_eq!(sample_from_f32(f32::NAN), 0);
    }

    #[test]
    fn test_mix_mono() {
        assert_eq!(mix_mono(100, 300), 200);
        assert_eq!(mix_mono(i16::MAX, i16::MAX), i16::MAX);
        assert_eq!(mix_mono(i16::MIN, i16::MIN), i16::MIN);
        assert_eq!(mix_mono(1000, -1000), 0);
    }

    #[test]
    fn test_i2s_word_layout() {
        assert_eq!(i2s_word(1, 2), 0x0002_0001);
        assert_eq!(i2s_word(-1, 0), 0x0000_FFFF);
    }

    #[test]
    fn test_render_stereo_to_mono() {
        let samples = [0.5, -0.5, 0.25, 0.25];
        let mut out = [0u32; 4];
        let n = render(&samples, 2, true, Volume::new(21), &mut out);
        assert_eq!(n, 2);
        assert_eq!(out[0], 0);
        let quarter = sample_from_f32(0.25);
        assert_eq!(out[1], i2s_word(quarter, quarter));
    }

    #[test]
    fn test_render_keeps_stereo() {
        let samples = [0.5, -0.5];
        let mut out = [0u32; 1];
        render(&samples, 2, false, Volume::new(21), &mut out);
        assert_eq!(out[0], i2s_word(sample_from_f32(0.5), sample_from_f32(-0.5)));
    }

    #[test]
    fn test_render_mono_source_duplicates_channel() {
        let samples = [0.5, 0.25, 0.0];
        let mut out = [0u32; 2];
        let n = render(&samples, 1, false, Volume::new(21), &mut out);
        assert_eq!(n, 2);
        let half = sample_from_f32(0.5);
        assert_eq!(out[0], i2s_word(half, half));
    }
}
