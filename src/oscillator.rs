// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Stateless waveform generators.
//!
//! Every generator is a pure function of a frequency in Hz and an absolute time in
//! seconds. There is no phase accumulator, so a sample can be computed for any time,
//! in any order, and a frequency change never requires resynchronizing anything.

use std::collections::hash_map::DefaultHasher;
use std::f64::consts::{FRAC_PI_2, PI};
use std::hash::{Hash, Hasher};

const TWO_PI: f64 = 2.0 * PI;

/// The periodic wave shapes a channel can be rendered with.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Saw,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Triangle,
        Waveform::Square,
        Waveform::Saw,
    ];

    /// Evaluate the wave at the given frequency and time.
    pub fn eval(self, frequency: f64, time: f64) -> f64 {
        match self {
            Waveform::Sine => sine(frequency, time),
            Waveform::Triangle => triangle(frequency, time),
            Waveform::Square => square(frequency, time),
            Waveform::Saw => saw(frequency, time),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
            Waveform::Saw => "saw",
        }
    }
}

impl Default for Waveform {
    fn default() -> Self {
        Waveform::Sine
    }
}

/// `sin(2π f t)`
pub fn sine(frequency: f64, time: f64) -> f64 {
    (frequency * TWO_PI * time).sin()
}

/// A triangle with the same period and phase as [`sine`].
///
/// ```
/// # use binaural_beat::oscillator::*;
/// assert!((triangle(1.0, 0.25) - 1.0).abs() < 1e-12);
/// assert_eq!(triangle(0.0, 3.0), 0.0);
/// ```
pub fn triangle(frequency: f64, time: f64) -> f64 {
    (frequency * TWO_PI * time).sin().asin() / FRAC_PI_2
}

/// The sign of [`sine`], where a zero crossing counts as positive.
/// The magnitude of the result is always exactly 1.
///
/// ```
/// # use binaural_beat::oscillator::*;
/// assert_eq!(square(0.0, 1.0), 1.0);
/// assert_eq!(square(1.0, 0.75), -1.0);
/// ```
pub fn square(frequency: f64, time: f64) -> f64 {
    1.0f64.copysign((frequency * TWO_PI * time).sin())
}

/// A rising sawtooth in `[-1, 1)`, wrapping where `f t` crosses a half-integer.
///
/// ```
/// # use binaural_beat::oscillator::*;
/// assert_eq!(saw(1.0, 0.0), 0.0);
/// assert_eq!(saw(1.0, 0.25), 0.5);
/// assert_eq!(saw(1.0, 0.5), -1.0);
/// ```
pub fn saw(frequency: f64, time: f64) -> f64 {
    let x = frequency * time;
    2.0 * (x - (x + 0.5).floor())
}

/// Deterministic noise in `[-1, 1]`.
///
/// The same note played at the same time produces the same noise, so replaying a
/// session sounds identical. Nothing is promised about the distribution.
pub fn noise(frequency: f64, time: f64) -> f64 {
    let mut x = frequency * TWO_PI * time;
    if x == 0.0 {
        // -0.0 and 0.0 must hash alike
        x = 0.0;
    }
    let mut hasher = DefaultHasher::new();
    x.to_bits().hash(&mut hasher);
    1.0 - 2.0 * (hasher.finish() as f64 / u64::MAX as f64)
}

#[cfg(test)]
mod test {
    use super::*;

    static FREQUENCIES: [f64; 7] = [0.0, 0.1, 1.0, 27.5, 440.0, 440.1, 1975.53];

    fn sweep() -> impl Iterator<Item = (f64, f64)> {
        FREQUENCIES.iter().flat_map(|&f| {
            (-200..200).map(move |i| (f, i as f64 * 0.000_731 + 0.000_01 * i as f64 * i as f64))
        })
    }

    #[test]
    fn bounded() {
        for (f, t) in sweep() {
            for &wave in Waveform::ALL.iter() {
                let s = wave.eval(f, t);
                assert!(s.is_finite(), "{:?}({}, {}) is not finite", wave, f, t);
                assert!(s >= -1.0 && s <= 1.0, "{:?}({}, {}) = {}", wave, f, t, s);
            }
            assert_eq!(square(f, t).abs(), 1.0);
            let n = noise(f, t);
            assert!(n >= -1.0 && n <= 1.0);
        }
    }

    #[test]
    fn rest_is_well_defined() {
        for &t in [0.0, 1.5, 1e6].iter() {
            assert_eq!(sine(0.0, t), 0.0);
            assert_eq!(triangle(0.0, t), 0.0);
            assert_eq!(square(0.0, t), 1.0);
            assert_eq!(saw(0.0, t), 0.0);
            assert!(noise(0.0, t).is_finite());
        }
    }

    #[test]
    fn noise_is_deterministic() {
        for (f, t) in sweep() {
            assert_eq!(noise(f, t), noise(f, t));
        }
        assert_eq!(noise(0.0, 1.0), noise(1.0, 0.0));
        assert_ne!(noise(440.0, 0.5), noise(440.0, 0.25));
    }

    #[test]
    fn saw_is_periodic() {
        for &f in [1.0, 27.5, 440.0, 123.4].iter() {
            for i in 0..100 {
                let t = i as f64 * 0.001_3;
                for n in 1..5 {
                    let shifted = saw(f, t + n as f64 / f);
                    let plain = saw(f, t);
                    // right at the wrap rounding may land on either side
                    let diff = (shifted - plain).abs();
                    assert!(diff < 1e-6 || (diff - 2.0).abs() < 1e-6, "{} {} {}", f, t, n);
                }
            }
        }
    }

    #[test]
    fn triangle_follows_sine_phase() {
        let f = 3.0;
        for i in 0..1000 {
            let t = i as f64 / 997.0;
            let s = sine(f, t);
            let tri = triangle(f, t);
            assert!(s * tri >= 0.0, "sign mismatch at {}", t);
        }
        assert!((triangle(f, 1.0 / 12.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn eval_dispatches() {
        let (f, t) = (440.0, 0.012_3);
        assert_eq!(Waveform::Sine.eval(f, t), sine(f, t));
        assert_eq!(Waveform::Triangle.eval(f, t), triangle(f, t));
        assert_eq!(Waveform::Square.eval(f, t), square(f, t));
        assert_eq!(Waveform::Saw.eval(f, t), saw(f, t));
    }
}
