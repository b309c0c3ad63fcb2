//! Noise sources and the procedural reverb impulse response.
//!
//! Both backends need the same colours: WebAudio loops a pre-rendered buffer,
//! the desktop graph runs [`PinkFilter`] per sample.

use super::graph::NoiseColor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Paul Kellet's refined pink filter: white in, roughly -3 dB/octave out.
#[derive(Clone, Debug, Default)]
pub struct PinkFilter {
    b: [f32; 7],
}

impl PinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn process(&mut self, white: f32) -> f32 {
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + white * 0.055_517_9;
        b[1] = 0.99332 * b[1] + white * 0.075_075_9;
        b[2] = 0.96900 * b[2] + white * 0.153_852;
        b[3] = 0.86650 * b[3] + white * 0.310_485_6;
        b[4] = 0.55000 * b[4] + white * 0.532_952_2;
        b[5] = -0.7616 * b[5] - white * 0.016_898;
        let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
        b[6] = white * 0.115_926;
        pink * 0.11
    }
}

/// `len` samples of seeded noise in `[-1, 1]`.
pub fn noise_buffer(color: NoiseColor, len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pink = PinkFilter::new();
    (0..len)
        .map(|_| {
            let white = rng.gen_range(-1.0_f32..=1.0);
            match color {
                NoiseColor::White => white,
                NoiseColor::Pink => pink.process(white).clamp(-1.0, 1.0),
            }
        })
        .collect()
}

/// Decaying stereo noise tail. Each channel reaches -60 dB at `decay_sec`;
/// the buffer runs `tail_factor` times longer so the end is silent.
pub fn impulse_response(
    sample_rate: f32,
    decay_sec: f32,
    tail_factor: f32,
    seed: u32,
) -> [Vec<f32>; 2] {
    let len = (sample_rate * decay_sec * tail_factor).max(1.0) as usize;
    // -60 dB is a factor of 1e-3 = e^-6.9
    let k = 6.907_755 / (decay_sec * sample_rate).max(1.0);
    let channel = |mut state: u32| -> Vec<f32> {
        (0..len)
            .map(|i| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                let n = (state as f32 / u32::MAX as f32) * 2.0 - 1.0;
                n * (-k * i as f32).exp()
            })
            .collect()
    };
    [channel(seed | 1), channel(seed.rotate_left(16) | 1)]
}
