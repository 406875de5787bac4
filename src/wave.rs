// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Sampled stereo audio.

use std::ops;

/// One of the two ears.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Channel {
    Left,
    Right,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Left, Channel::Right];

    /// Map an audio channel number to an ear, 0 being left.
    ///
    /// ```
    /// use binaural_beat::wave::Channel;
    ///
    /// assert_eq!(Channel::from_index(0), Some(Channel::Left));
    /// assert_eq!(Channel::from_index(1), Some(Channel::Right));
    /// assert_eq!(Channel::from_index(2), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Channel> {
        match index {
            0 => Some(Channel::Left),
            1 => Some(Channel::Right),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

/// Convenience type for making things stereo, e.g. individual samples or per-ear state.
///
/// ```
/// use binaural_beat::wave::*;
///
/// let mut stereo = Stereo::new(0.25, 0.5);
/// stereo[Channel::Left] = -0.25;
/// assert_eq!(stereo, Stereo::new(-0.25, 0.5));
/// assert_eq!(stereo[Channel::Right], 0.5);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Stereo<T> {
    pub left: T,
    pub right: T,
}

impl<T> Stereo<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn mono(mono: T) -> Self
    where
        T: Copy,
    {
        Self::new(mono, mono)
    }

    /// Build both sides by evaluating `f` for the left and then the right ear.
    pub fn from_fn<F: FnMut(Channel) -> T>(mut f: F) -> Self {
        let left = f(Channel::Left);
        let right = f(Channel::Right);
        Self::new(left, right)
    }
}

impl<T> ops::Index<Channel> for Stereo<T> {
    type Output = T;

    fn index(&self, channel: Channel) -> &T {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
        }
    }
}

impl<T> ops::IndexMut<Channel> for Stereo<T> {
    fn index_mut(&mut self, channel: Channel) -> &mut T {
        match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
        }
    }
}

/// A buffer holding floating point audio data.
pub struct AudioBuffer {
    samples: Vec<Stereo<f64>>,
}

#[allow(clippy::len_without_is_empty)]
impl AudioBuffer {
    pub fn new(sample_count: usize) -> Self {
        Self {
            samples: vec![Stereo::mono(0.0); sample_count],
        }
    }

    /// Size of the buffer in samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Size of the buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.len() * 2 * std::mem::size_of::<f64>()
    }

    pub fn samples(&self) -> &[Stereo<f64>] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [Stereo<f64>] {
        &mut self.samples
    }

    /// Copy the stereo `f64` samples to bytes, interleaving the left and right samples.
    ///
    /// Returns the number of samples that were actually copied.
    /// Might be less than the number of input samples if the output buffer was not large enough.
    pub fn copy_bytes_to(&self, bytes: &mut [u8]) -> usize {
        let mut processed = 0;
        for (sample, target) in self.samples.iter().zip(bytes.chunks_exact_mut(16)) {
            target[0..8].copy_from_slice(&sample.left.to_le_bytes());
            target[8..16].copy_from_slice(&sample.right.to_le_bytes());
            processed += 1;
        }
        processed
    }
}
