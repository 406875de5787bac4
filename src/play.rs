// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Drive the engine into an audio sink.

use std::path::Path;
use std::thread;

use log::{debug, info};

use crate::engine::SynthesisEngine;
use crate::output::{PlayError, Sink, SoxSink, SoxTarget};
use crate::shared::{self, AudioSide, Controller};
use crate::wave::AudioBuffer;

/// How audio is sampled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SamplerInfo {
    /// Number of samples per second.
    pub sample_rate: u32,
    /// Number of samples per buffer.
    /// This determines how quickly an intent is heard.
    pub buffer_size: usize,
}

impl Default for SamplerInfo {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            buffer_size: 512,
        }
    }
}

impl SamplerInfo {
    /// Number of samples covering `seconds`, rounded up to whole buffers.
    ///
    /// ```
    /// use binaural_beat::play::SamplerInfo;
    ///
    /// let info = SamplerInfo { sample_rate: 1000, buffer_size: 300 };
    /// assert_eq!(info.samples_for(1.0), 1200);
    /// assert_eq!(info.samples_for(0.0), 0);
    /// ```
    pub fn samples_for(&self, seconds: f64) -> u64 {
        let buffer = self.buffer_size.max(1) as u64;
        // float to integer casts saturate, huge durations end up at u64::MAX
        let samples = (seconds.max(0.0) * self.sample_rate as f64).ceil() as u64;
        samples.saturating_add(buffer - 1) / buffer * buffer
    }
}

/// Renders consecutive buffers, keeping track of the elapsed time.
pub struct Renderer {
    info: SamplerInfo,
    buffer: AudioBuffer,
    samples_processed: u64,
}

impl Renderer {
    pub fn new(info: SamplerInfo) -> Self {
        Self {
            info,
            buffer: AudioBuffer::new(info.buffer_size.max(1)),
            samples_processed: 0,
        }
    }

    pub fn samples_processed(&self) -> u64 {
        self.samples_processed
    }

    /// Render one buffer and hand it to the sink.
    /// Returns `false` if the sink did not accept it.
    pub fn step(&mut self, audio: &mut AudioSide, sink: &mut dyn Sink) -> bool {
        audio.fill_buffer(
            self.buffer.samples_mut(),
            self.samples_processed,
            self.info.sample_rate as f64,
        );
        self.samples_processed += self.buffer.len() as u64;
        sink.write(&self.buffer)
    }

    /// Render until quitting is requested, the sink fails, or `limit` samples
    /// have been rendered.
    pub fn run(&mut self, audio: &mut AudioSide, sink: &mut dyn Sink, limit: Option<u64>) -> u64 {
        while !audio.quit_requested() {
            if let Some(limit) = limit {
                if self.samples_processed >= limit {
                    break;
                }
            }
            if !self.step(audio, sink) {
                break;
            }
        }
        self.samples_processed
    }
}

/// Play on the default speakers while `interact` runs on the calling thread.
///
/// Rendering happens on a separate thread and stops when `interact` returns or
/// sends [`Intent::Quit`](crate::control::Intent::Quit).
pub fn play_interactive<F>(
    engine: SynthesisEngine,
    info: SamplerInfo,
    interact: F,
) -> Result<u64, PlayError>
where
    F: FnOnce(&Controller),
{
    let (controller, mut audio) = shared::share(engine, shared::DEFAULT_QUEUE_CAPACITY);
    let mut sink = SoxSink::new(info.sample_rate, SoxTarget::Play)?;

    info!(
        "playing at {} Hz, {} samples per buffer",
        info.sample_rate, info.buffer_size
    );
    let render = thread::spawn(move || {
        let mut renderer = Renderer::new(info);
        let samples = renderer.run(&mut audio, &mut sink, None);
        (sink, samples)
    });

    interact(&controller);
    controller.quit();

    let (sink, samples) = render.join().map_err(|_| PlayError::AudioThread)?;
    debug!("audio thread stopped after {} samples", samples);
    sink.finish()?;
    info!(
        "played {:.2} seconds",
        samples as f64 / info.sample_rate as f64
    );
    Ok(samples)
}

/// Render `seconds` of audio to a file, without any interaction.
pub fn render_to_file(
    engine: SynthesisEngine,
    info: SamplerInfo,
    path: &Path,
    seconds: f64,
) -> Result<u64, PlayError> {
    let (_controller, mut audio) = shared::share(engine, 1);
    let mut sink = SoxSink::new(info.sample_rate, SoxTarget::File(path))?;
    let total = info.samples_for(seconds);
    info!(
        "rendering {} samples ({:.2} seconds) to {}",
        total,
        total as f64 / info.sample_rate as f64,
        path.display()
    );
    let samples = Renderer::new(info).run(&mut audio, &mut sink, Some(total));
    sink.finish()?;
    Ok(samples)
}
