// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The synthesis engine, combining both ears, the noise floor and the global settings.

use std::fmt;

use log::debug;

use crate::blender::{ChannelBlender, Pitch, BIAS_STEPS_PER_HZ, TRANSITION_STEPS};
use crate::control::{Direction, Intent};
use crate::note::{NoteIndex, NoteLabels};
use crate::oscillator::{self, Waveform};
use crate::tuning::{FrequencyTable, TuningKind, Tunings, A440};
use crate::wave::{Channel, Stereo};

/// Everything that can be tuned about the engine before it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Frequency of the A above middle C in Hz.
    pub reference_pitch: f64,
    /// Largest allowed difference between the two ears in Hz.
    pub max_beat: i32,
    /// Length of a cross-fade in samples.
    pub transition_steps: u32,
    /// Gain applied to each ear's tone.
    pub tone_gain: f64,
    /// Gain applied to the noise floor when it is switched on.
    pub noise_attenuation: f64,
    /// Note both ears fade to right after startup.
    pub start_note: NoteIndex,
    pub waveform: Waveform,
    pub tuning: TuningKind,
    pub noise: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_pitch: A440,
            max_beat: 14,
            transition_steps: TRANSITION_STEPS,
            tone_gain: 0.125,
            noise_attenuation: 1.0 / 64.0,
            start_note: NoteIndex::A4,
            waveform: Waveform::Sine,
            tuning: TuningKind::EqualTemperament,
            noise: false,
        }
    }
}

/// Renders both ears from an absolute time and applies the user's intents.
pub struct SynthesisEngine {
    tunings: Tunings,
    labels: NoteLabels,
    channels: Stereo<ChannelBlender>,
    tuning: TuningKind,
    waveform: Waveform,
    noise_gain: f64,
    tone_gain: f64,
    noise_attenuation: f64,
    /// Largest allowed bias difference between the ears, in bias units.
    max_bias_difference: i32,
    last_time: f64,
}

impl SynthesisEngine {
    /// Build the tables and start both ears at rest, fading to the configured start note.
    pub fn new(config: &EngineConfig) -> Self {
        let blender = || ChannelBlender::with_steps(Pitch::REST, config.transition_steps);
        let mut channels = Stereo::new(blender(), blender());
        if !config.start_note.is_rest() {
            for &channel in Channel::ALL.iter() {
                channels[channel].request(Pitch::new(config.start_note, 0));
            }
        }
        Self {
            tunings: Tunings::new(config.reference_pitch),
            labels: NoteLabels::new(),
            channels,
            tuning: config.tuning,
            waveform: config.waveform,
            noise_gain: if config.noise { 1.0 } else { 0.0 },
            tone_gain: config.tone_gain,
            noise_attenuation: config.noise_attenuation,
            max_bias_difference: config.max_beat * BIAS_STEPS_PER_HZ,
            last_time: 0.0,
        }
    }

    /// Produce the sample of one ear at the given elapsed time.
    ///
    /// Each call advances a running transition of that ear by one step, so the
    /// audio subsystem must call this exactly once per sample and channel.
    pub fn produce_sample(&mut self, channel: Channel, time: f64, _time_step: f64) -> f64 {
        self.last_time = time;
        let table = self.tunings.table(self.tuning);
        let tone = self.channels[channel].next_sample(table, self.waveform, time);
        let base = table.frequency(self.channels.left.pitch().note);
        let floor = oscillator::noise(base, time) * self.noise_attenuation;
        tone * self.tone_gain + self.noise_gain * floor
    }

    /// Produce the samples of both ears, left first.
    pub fn render_frame(&mut self, time: f64, time_step: f64) -> Stereo<f64> {
        Stereo::from_fn(|channel| self.produce_sample(channel, time, time_step))
    }

    /// Fill a whole buffer, where `first_sample` counts the samples rendered before it.
    pub fn fill_buffer(&mut self, buffer: &mut [Stereo<f64>], first_sample: u64, sample_rate: f64) {
        let time_step = 1.0 / sample_rate;
        for (i, frame) in buffer.iter_mut().enumerate() {
            let time = (first_sample + i as u64) as f64 / sample_rate;
            *frame = self.render_frame(time, time_step);
        }
    }

    /// Whether neither ear is in the middle of a transition.
    pub fn is_steady(&self) -> bool {
        self.channels.left.is_steady() && self.channels.right.is_steady()
    }

    /// Move both ears one scale degree up or down, keeping their biases.
    ///
    /// Rejected while any ear is transitioning or when the left ear is already at the
    /// end of the table.
    pub fn request_note_step(&mut self, direction: Direction) -> bool {
        if !self.is_steady() {
            debug!("note step {:?} ignored, transition in progress", direction);
            return false;
        }
        let delta = direction.delta();
        let left = self.channels.left.pitch().note;
        if left.step(delta) == left {
            debug!("note step {:?} ignored, {} is the last note", direction, left);
            return false;
        }
        for &channel in Channel::ALL.iter() {
            let current = self.channels[channel].pitch();
            let target = Pitch::new(current.note.step(delta), current.bias);
            self.channels[channel].request(target);
        }
        debug!("note step {:?} to {}", direction, left.step(delta));
        true
    }

    /// Change the bias of one ear by one unit.
    ///
    /// Rejected while any ear is transitioning, or if the resulting beat would exceed
    /// the configured maximum.
    pub fn request_bias_step(&mut self, channel: Channel, direction: Direction) -> bool {
        if !self.is_steady() {
            debug!("bias step {:?} {:?} ignored, transition in progress", channel, direction);
            return false;
        }
        let delta = direction.delta() as i32;
        let mut biases = Stereo::new(
            self.channels.left.pitch().bias,
            self.channels.right.pitch().bias,
        );
        biases[channel] += delta;
        if (biases.left - biases.right).abs() > self.max_bias_difference {
            debug!("bias step {:?} {:?} ignored, beat limit reached", channel, direction);
            return false;
        }
        let note = self.channels[channel].pitch().note;
        self.channels[channel].request(Pitch::new(note, biases[channel]));
        debug!("bias of {:?} ear to {}", channel, biases[channel]);
        true
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn set_tuning(&mut self, tuning: TuningKind) {
        self.tuning = tuning;
    }

    pub fn toggle_tuning(&mut self) {
        self.tuning = self.tuning.toggled();
    }

    pub fn toggle_noise(&mut self) {
        self.noise_gain = 1.0 - self.noise_gain;
    }

    /// Carry out an intent of the user. Returns `false` if it was rejected or has
    /// no meaning for the engine.
    pub fn apply(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::NoteStep(direction) => self.request_note_step(direction),
            Intent::BiasStep(channel, direction) => self.request_bias_step(channel, direction),
            Intent::SetWaveform(waveform) => {
                self.set_waveform(waveform);
                true
            }
            Intent::SetTuning(tuning) => {
                self.set_tuning(tuning);
                true
            }
            Intent::ToggleTuning => {
                self.toggle_tuning();
                true
            }
            Intent::ToggleNoise => {
                self.toggle_noise();
                true
            }
            Intent::Quit => false,
        }
    }

    pub fn channel(&self, channel: Channel) -> &ChannelBlender {
        &self.channels[channel]
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn tuning(&self) -> TuningKind {
        self.tuning
    }

    pub fn noise_enabled(&self) -> bool {
        self.noise_gain != 0.0
    }

    /// Elapsed time passed to the most recent sample.
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    /// The table of the active tuning.
    pub fn table(&self) -> &FrequencyTable {
        self.tunings.table(self.tuning)
    }

    pub fn tunings(&self) -> &Tunings {
        &self.tunings
    }

    pub fn labels(&self) -> &NoteLabels {
        &self.labels
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pitches: Stereo::from_fn(|channel| self.channels[channel].pitch()),
            steady: Stereo::from_fn(|channel| self.channels[channel].is_steady()),
            waveform: self.waveform,
            tuning: self.tuning,
            noise: self.noise_enabled(),
            last_time: self.last_time,
        }
    }
}

/// The brainwave band a beat frequency is associated with.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BeatBand {
    Delta,
    Theta,
    Alpha,
    Beta,
}

impl BeatBand {
    /// Classify a beat in Hz. Beats below 0.4 Hz belong to no band.
    ///
    /// ```
    /// use binaural_beat::engine::BeatBand;
    ///
    /// assert_eq!(BeatBand::classify(0.0), None);
    /// assert_eq!(BeatBand::classify(0.4), Some(BeatBand::Delta));
    /// assert_eq!(BeatBand::classify(4.0), Some(BeatBand::Delta));
    /// assert_eq!(BeatBand::classify(4.1), Some(BeatBand::Theta));
    /// assert_eq!(BeatBand::classify(14.0), Some(BeatBand::Alpha));
    /// assert_eq!(BeatBand::classify(14.1), Some(BeatBand::Beta));
    /// ```
    pub fn classify(beat: f64) -> Option<BeatBand> {
        if beat < 0.4 {
            None
        } else if beat <= 4.0 {
            Some(BeatBand::Delta)
        } else if beat <= 8.0 {
            Some(BeatBand::Theta)
        } else if beat <= 14.0 {
            Some(BeatBand::Alpha)
        } else {
            Some(BeatBand::Beta)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BeatBand::Delta => "Delta",
            BeatBand::Theta => "Theta",
            BeatBand::Alpha => "Alpha",
            BeatBand::Beta => "Beta",
        }
    }

    /// The state of mind the band is said to induce.
    pub fn effect(self) -> &'static str {
        match self {
            BeatBand::Delta => "Sleep",
            BeatBand::Theta => "Meditate",
            BeatBand::Alpha => "Relax",
            BeatBand::Beta => "Anxiety",
        }
    }
}

/// The part of the engine state that is of interest for display.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Committed pitch of each ear.
    pub pitches: Stereo<Pitch>,
    pub steady: Stereo<bool>,
    pub waveform: Waveform,
    pub tuning: TuningKind,
    pub noise: bool,
    pub last_time: f64,
}

impl Snapshot {
    /// The note both ears are based on, taken from the left ear.
    pub fn base_note(&self) -> NoteIndex {
        self.pitches.left.note
    }

    /// Beat frequency in Hz.
    pub fn beat(&self) -> f64 {
        (self.pitches.left.bias - self.pitches.right.bias).abs() as f64 / BIAS_STEPS_PER_HZ as f64
    }

    pub fn band(&self) -> Option<BeatBand> {
        BeatBand::classify(self.beat())
    }

    /// Frequency heard on each ear, both relative to the base note.
    pub fn ear_frequencies(&self, tunings: &Tunings) -> Stereo<f64> {
        let table = tunings.table(self.tuning);
        Stereo::from_fn(|channel| {
            Pitch::new(self.base_note(), self.pitches[channel].bias).frequency(table)
        })
    }

    /// Human readable rendition of the snapshot.
    pub fn report<'a>(&'a self, tunings: &'a Tunings, labels: &'a NoteLabels) -> Report<'a> {
        Report {
            snapshot: self,
            tunings,
            labels,
        }
    }
}

/// Display adapter returned by [`Snapshot::report`].
pub struct Report<'a> {
    snapshot: &'a Snapshot,
    tunings: &'a Tunings,
    labels: &'a NoteLabels,
}

impl<'a> fmt::Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = self.snapshot;
        let base = s.base_note();
        let ears = s.ear_frequencies(self.tunings);
        writeln!(
            f,
            "Base: {:.6} {}",
            self.tunings.table(s.tuning).frequency(base),
            self.labels.label(base)
        )?;
        writeln!(f, "Left Ear: {:.6}", ears.left)?;
        writeln!(f, "Right Ear: {:.6}", ears.right)?;
        writeln!(f, "Beat: {:.6}", s.beat())?;
        if let Some(band) = s.band() {
            writeln!(f, "{} ({})", band.name(), band.effect())?;
        }
        write!(f, "Time: {:.6}", s.last_time)
    }
}
