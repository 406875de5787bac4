// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Sharing one engine between the interactive thread and the audio thread.
//!
//! The audio thread owns the [`SynthesisEngine`]. The interactive thread never
//! touches it directly, it sends [`Intent`]s through a bounded queue that the
//! audio thread drains without blocking before every buffer. After every buffer
//! the audio thread publishes a snapshot of the engine state into atomics, with
//! the note, bias and transition flag of each ear packed into a single word so
//! that a reader never sees a note without its matching bias.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use log::{debug, warn};

use crate::blender::Pitch;
use crate::control::Intent;
use crate::engine::{Snapshot, SynthesisEngine};
use crate::note::{NoteIndex, NoteLabels};
use crate::oscillator::Waveform;
use crate::tuning::{TuningKind, Tunings};
use crate::wave::{Channel, Stereo};

/// Number of intents that may be queued before further ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

const STEADY_BIT: u64 = 1 << 32;
const NOTE_SHIFT: u32 = 40;

fn pack_channel(pitch: Pitch, steady: bool) -> u64 {
    let steady = if steady { STEADY_BIT } else { 0 };
    ((pitch.note.index() as u64) << NOTE_SHIFT) | steady | u64::from(pitch.bias as u32)
}

fn unpack_channel(word: u64) -> (Pitch, bool) {
    let note = NoteIndex::clamped(((word >> NOTE_SHIFT) & 0xff) as i64);
    let bias = (word & 0xffff_ffff) as u32 as i32;
    (Pitch::new(note, bias), word & STEADY_BIT != 0)
}

fn pack_settings(waveform: Waveform, tuning: TuningKind, noise: bool) -> u32 {
    let waveform = Waveform::ALL
        .iter()
        .position(|&w| w == waveform)
        .unwrap_or(0) as u32;
    let tuning = match tuning {
        TuningKind::EqualTemperament => 0,
        TuningKind::Pythagorean => 1,
    };
    waveform | tuning << 4 | (noise as u32) << 8
}

fn unpack_settings(word: u32) -> (Waveform, TuningKind, bool) {
    let waveform = Waveform::ALL
        .get((word & 0xf) as usize)
        .copied()
        .unwrap_or_default();
    let tuning = if (word >> 4) & 0xf == 1 {
        TuningKind::Pythagorean
    } else {
        TuningKind::EqualTemperament
    };
    (waveform, tuning, (word >> 8) & 1 == 1)
}

/// State visible to both threads.
struct Published {
    channels: [AtomicU64; 2],
    settings: AtomicU32,
    last_time: AtomicU64,
    quit: AtomicBool,
    tunings: Tunings,
    labels: NoteLabels,
}

impl Published {
    fn store(&self, snapshot: &Snapshot) {
        for &channel in Channel::ALL.iter() {
            let word = pack_channel(snapshot.pitches[channel], snapshot.steady[channel]);
            self.channels[channel.index()].store(word, Ordering::Release);
        }
        let settings = pack_settings(snapshot.waveform, snapshot.tuning, snapshot.noise);
        self.settings.store(settings, Ordering::Release);
        self.last_time
            .store(snapshot.last_time.to_bits(), Ordering::Release);
    }

    fn load(&self) -> Snapshot {
        let left = unpack_channel(self.channels[0].load(Ordering::Acquire));
        let right = unpack_channel(self.channels[1].load(Ordering::Acquire));
        let (waveform, tuning, noise) = unpack_settings(self.settings.load(Ordering::Acquire));
        Snapshot {
            pitches: Stereo::new(left.0, right.0),
            steady: Stereo::new(left.1, right.1),
            waveform,
            tuning,
            noise,
            last_time: f64::from_bits(self.last_time.load(Ordering::Acquire)),
        }
    }
}

/// Split an engine into the handle used by the interactive thread and the part
/// that is moved to the audio thread.
pub fn share(engine: SynthesisEngine, queue_capacity: usize) -> (Controller, AudioSide) {
    let (sender, receiver) = crossbeam_channel::bounded(queue_capacity.max(1));
    let published = Arc::new(Published {
        channels: [AtomicU64::new(0), AtomicU64::new(0)],
        settings: AtomicU32::new(0),
        last_time: AtomicU64::new(0),
        quit: AtomicBool::new(false),
        tunings: engine.tunings().clone(),
        labels: engine.labels().clone(),
    });
    published.store(&engine.snapshot());
    let controller = Controller {
        intents: sender,
        published: Arc::clone(&published),
    };
    let audio = AudioSide {
        engine,
        intents: receiver,
        published,
    };
    (controller, audio)
}

/// The interactive thread's view of the engine.
#[derive(Clone)]
pub struct Controller {
    intents: Sender<Intent>,
    published: Arc<Published>,
}

impl Controller {
    /// Queue an intent for the audio thread.
    ///
    /// Returns `false` if the queue is full or the audio side is gone, in which case
    /// the intent is dropped. Quitting never goes through the queue.
    pub fn send(&self, intent: Intent) -> bool {
        if intent == Intent::Quit {
            self.quit();
            return true;
        }
        match self.intents.try_send(intent) {
            Ok(()) => true,
            Err(TrySendError::Full(intent)) => {
                warn!("dropping {:?}, the audio thread is not keeping up", intent);
                false
            }
            Err(TrySendError::Disconnected(intent)) => {
                debug!("dropping {:?}, the audio thread has stopped", intent);
                false
            }
        }
    }

    /// Ask the audio thread to stop after the current buffer.
    pub fn quit(&self) {
        self.published.quit.store(true, Ordering::Release);
    }

    /// The state as of the last rendered buffer.
    pub fn snapshot(&self) -> Snapshot {
        self.published.load()
    }

    pub fn tunings(&self) -> &Tunings {
        &self.published.tunings
    }

    pub fn labels(&self) -> &NoteLabels {
        &self.published.labels
    }

    /// The status text shown after every command.
    pub fn report(&self) -> String {
        self.snapshot()
            .report(self.tunings(), self.labels())
            .to_string()
    }
}

/// The audio thread's side, owning the engine.
pub struct AudioSide {
    engine: SynthesisEngine,
    intents: Receiver<Intent>,
    published: Arc<Published>,
}

impl AudioSide {
    /// Apply all queued intents in the order they were sent. Never blocks.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.intents.try_recv() {
                Ok(intent) => {
                    self.engine.apply(intent);
                    applied += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Render the next buffer and publish the resulting state.
    pub fn fill_buffer(&mut self, buffer: &mut [Stereo<f64>], first_sample: u64, sample_rate: f64) {
        self.apply_pending();
        self.engine.fill_buffer(buffer, first_sample, sample_rate);
        self.publish();
    }

    pub fn publish(&self) {
        self.published.store(&self.engine.snapshot());
    }

    /// Whether the interactive side asked to stop.
    pub fn quit_requested(&self) -> bool {
        self.published.quit.load(Ordering::Acquire)
    }

    pub fn engine(&self) -> &SynthesisEngine {
        &self.engine
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::control::Direction;
    use crate::engine::EngineConfig;

    fn rest_config() -> EngineConfig {
        EngineConfig {
            start_note: NoteIndex::REST,
            transition_steps: 8,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn packing_keeps_pairs() {
        for &bias in [0, 1, -1, 140, -140, i32::MAX, i32::MIN].iter() {
            for index in 0..crate::note::TOTAL_NOTES {
                let pitch = Pitch::new(NoteIndex::clamped(index as i64), bias);
                assert_eq!(unpack_channel(pack_channel(pitch, true)), (pitch, true));
                assert_eq!(unpack_channel(pack_channel(pitch, false)), (pitch, false));
            }
        }
        for &waveform in Waveform::ALL.iter() {
            for &tuning in [TuningKind::EqualTemperament, TuningKind::Pythagorean].iter() {
                for &noise in [false, true].iter() {
                    let word = pack_settings(waveform, tuning, noise);
                    assert_eq!(unpack_settings(word), (waveform, tuning, noise));
                }
            }
        }
    }

    #[test]
    fn intents_reach_the_engine() {
        let (controller, mut audio) = share(SynthesisEngine::new(&rest_config()), 4);
        assert!(controller.send(Intent::NoteStep(Direction::Up)));
        assert!(controller.send(Intent::SetWaveform(Waveform::Square)));
        // still published from before the buffer
        assert_eq!(controller.snapshot().waveform, Waveform::Sine);

        let mut buffer = vec![Stereo::mono(0.0); 4];
        audio.fill_buffer(&mut buffer, 0, 48000.0);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.waveform, Waveform::Square);
        assert_eq!(snapshot.steady, Stereo::mono(false));
        assert_eq!(snapshot.pitches.left.note, NoteIndex::REST);
        assert_eq!(snapshot.last_time, 3.0 / 48000.0);

        audio.fill_buffer(&mut buffer, 4, 48000.0);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.steady, Stereo::mono(true));
        assert_eq!(snapshot.pitches, Stereo::mono(Pitch::new(NoteIndex::clamped(1), 0)));
        assert_eq!(snapshot, audio.engine().snapshot());
    }

    #[test]
    fn full_queue_drops_intents() {
        let (controller, mut audio) = share(SynthesisEngine::new(&rest_config()), 2);
        assert!(controller.send(Intent::ToggleNoise));
        assert!(controller.send(Intent::ToggleTuning));
        assert!(!controller.send(Intent::ToggleNoise));
        assert_eq!(audio.apply_pending(), 2);
        audio.publish();
        let snapshot = controller.snapshot();
        assert!(snapshot.noise);
        assert_eq!(snapshot.tuning, TuningKind::Pythagorean);
    }

    #[test]
    fn quit_bypasses_the_queue() {
        let (controller, audio) = share(SynthesisEngine::new(&rest_config()), 1);
        assert!(controller.send(Intent::ToggleNoise));
        assert!(!audio.quit_requested());
        assert!(controller.send(Intent::Quit));
        assert!(audio.quit_requested());
    }

    #[test]
    fn works_across_threads() {
        let (controller, mut audio) = share(SynthesisEngine::new(&rest_config()), 16);
        let render = std::thread::spawn(move || {
            let mut buffer = vec![Stereo::mono(0.0); 32];
            let mut sample = 0;
            while !audio.quit_requested() {
                audio.fill_buffer(&mut buffer, sample, 48000.0);
                sample += buffer.len() as u64;
                std::thread::yield_now();
            }
            audio.engine().snapshot()
        });

        // each step is committed within the buffer it is applied in
        for step in 1..=5 {
            while !controller.send(Intent::BiasStep(Channel::Left, Direction::Up)) {
                std::thread::yield_now();
            }
            while controller.snapshot().pitches.left.bias < step {
                std::thread::yield_now();
            }
        }
        controller.send(Intent::Quit);
        let last = render.join().unwrap();
        assert_eq!(last.pitches.left.bias, 5);
        assert_eq!(controller.report().lines().nth(3), Some("Beat: 0.500000"));
    }
}
