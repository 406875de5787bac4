// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Where rendered audio ends up.

pub mod sox;

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use log::error;
use snafu::Snafu;

use crate::wave::AudioBuffer;

pub use sox::{SoxSink, SoxTarget};

/// Possible errors while playing or rendering.
#[derive(Debug, Snafu)]
pub enum PlayError {
    #[snafu(display("Could not start {}: {}", program.display(), source))]
    SpawnSox { program: PathBuf, source: io::Error },
    #[snafu(display("Failed to write audio to sox: {}", source))]
    WriteAudio { source: io::Error },
    #[snafu(display("Waiting for sox failed: {}", source))]
    WaitSox { source: io::Error },
    #[snafu(display("sox exited with {}", status))]
    SoxFailed { status: ExitStatus },
    #[snafu(display("The audio thread panicked"))]
    AudioThread,
}

/// Consumer of rendered buffers.
pub trait Sink {
    /// Hand over a buffer. Returns `false` once the sink can no longer accept audio.
    fn write(&mut self, buffer: &AudioBuffer) -> bool;
}

/// Writes interleaved little-endian `f64` frames to any byte stream.
///
/// The first write error is logged and kept, all further audio is discarded.
pub struct StreamSink<W> {
    stream: W,
    bytes: Vec<u8>,
    error: Option<io::Error>,
}

impl<W: io::Write> StreamSink<W> {
    pub fn new(stream: W) -> Self {
        Self {
            stream,
            bytes: Vec::new(),
            error: None,
        }
    }

    /// Give back the stream together with the error that stopped it, if any.
    pub fn into_parts(self) -> (W, Option<io::Error>) {
        (self.stream, self.error)
    }
}

impl<W: io::Write> Sink for StreamSink<W> {
    fn write(&mut self, buffer: &AudioBuffer) -> bool {
        if self.error.is_some() {
            return false;
        }
        if self.bytes.len() != buffer.byte_len() {
            self.bytes.resize(buffer.byte_len(), 0);
        }
        buffer.copy_bytes_to(&mut self.bytes);

        let status = self
            .stream
            .write_all(&self.bytes)
            .and_then(|_| self.stream.flush());
        if let Err(err) = status {
            error!("Failed to write audio: {}", err);
            self.error = Some(err);
            return false;
        }
        true
    }
}
