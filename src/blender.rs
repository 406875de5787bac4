// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Click-free transitions between the pitches of a single channel.
//!
//! A channel is either steady, playing its committed pitch, or transitioning,
//! in which case the old and the new pitch are both rendered and linearly
//! cross-faded over a fixed number of samples. Only once the fade is complete
//! is the new pitch committed, note and bias together.

use crate::note::NoteIndex;
use crate::oscillator::Waveform;
use crate::tuning::FrequencyTable;

/// Bias is counted in tenths of a Hz.
pub const BIAS_STEPS_PER_HZ: i32 = 10;

/// Number of samples a cross-fade takes (about 21 ms at 48 kHz).
pub const TRANSITION_STEPS: u32 = 1000;

/// A note together with its fine offset, the unit in which channels change pitch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pitch {
    pub note: NoteIndex,
    /// Offset added to the table frequency, in `1 / BIAS_STEPS_PER_HZ` Hz.
    pub bias: i32,
}

impl Pitch {
    pub const REST: Pitch = Pitch {
        note: NoteIndex::REST,
        bias: 0,
    };

    pub fn new(note: NoteIndex, bias: i32) -> Self {
        Self { note, bias }
    }

    /// Frequency of this pitch in Hz relative to the given table.
    ///
    /// ```
    /// use binaural_beat::blender::Pitch;
    /// use binaural_beat::note::NoteIndex;
    /// use binaural_beat::tuning::*;
    ///
    /// let table = FrequencyTable::new(A440, TuningKind::EqualTemperament);
    /// let pitch = Pitch::new(NoteIndex::named_str("A4").unwrap(), -25);
    /// assert_eq!(pitch.frequency(&table), 437.5);
    /// ```
    pub fn frequency(self, table: &FrequencyTable) -> f64 {
        table.frequency(self.note) + self.bias as f64 / BIAS_STEPS_PER_HZ as f64
    }
}

#[derive(Copy, Clone, Debug)]
struct Transition {
    target: Pitch,
    /// Samples rendered since the transition started, always below the step count.
    counter: u32,
}

/// The state of one ear.
#[derive(Clone, Debug)]
pub struct ChannelBlender {
    committed: Pitch,
    transition: Option<Transition>,
    steps: u32,
}

impl ChannelBlender {
    pub fn new(pitch: Pitch) -> Self {
        Self::with_steps(pitch, TRANSITION_STEPS)
    }

    /// Create a steady channel whose transitions take `steps` samples (at least one).
    pub fn with_steps(pitch: Pitch, steps: u32) -> Self {
        Self {
            committed: pitch,
            transition: None,
            steps: steps.max(1),
        }
    }

    /// The committed pitch. While transitioning, this is still the old one.
    pub fn pitch(&self) -> Pitch {
        self.committed
    }

    /// The pitch being faded to, if any.
    pub fn pending(&self) -> Option<Pitch> {
        self.transition.map(|t| t.target)
    }

    /// Number of samples already rendered in the current transition.
    pub fn progress(&self) -> Option<u32> {
        self.transition.map(|t| t.counter)
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_steady(&self) -> bool {
        self.transition.is_none()
    }

    /// Start fading to `target`.
    ///
    /// Requests are only accepted while the channel is steady, a request arriving
    /// during a transition is dropped and `false` is returned.
    pub fn request(&mut self, target: Pitch) -> bool {
        if self.transition.is_some() {
            return false;
        }
        self.transition = Some(Transition { target, counter: 0 });
        true
    }

    /// Render the sample at `time`, advancing a running transition by one step.
    pub fn next_sample(&mut self, table: &FrequencyTable, waveform: Waveform, time: f64) -> f64 {
        let current = waveform.eval(self.committed.frequency(table), time);
        let transition = match self.transition.as_mut() {
            None => return current,
            Some(transition) => transition,
        };

        let target = waveform.eval(transition.target.frequency(table), time);
        let steps = self.steps as f64;
        let counter = transition.counter as f64;
        let result = current * (steps - counter) / steps + target * counter / steps;

        transition.counter += 1;
        if transition.counter >= self.steps {
            self.committed = transition.target;
            self.transition = None;
        }
        result
    }
}
