// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Easy interface for getting sound to play using a sox subprocess.

use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use snafu::ResultExt;

use super::{PlayError, Sink, SpawnSox, StreamSink, WaitSox};
use crate::wave::AudioBuffer;

pub enum SoxTarget<'a> {
    /// Play on the default speakers.
    Play,
    /// Write to a file in any format sox supports.
    File(&'a Path),
}

/// Streams stereo `f64` audio into `play` or `sox`.
pub struct SoxSink {
    player: Child,
    stream: StreamSink<ChildStdin>,
}

impl SoxSink {
    pub fn new(sample_rate: u32, target: SoxTarget) -> Result<Self, PlayError> {
        let sample_rate_str = format!("{}", sample_rate);
        let input_args = &[
            "-R", // make the output reproducible
            "--channels",
            "2",
            "--rate",
            &sample_rate_str,
            "--type",
            "f64",
            "/dev/stdin",
        ];

        // For properly recording the sox dependency on nix:
        let (play, sox): (PathBuf, PathBuf) = if let Some(sox_bin) = option_env!("NIX_SOX_BIN") {
            log::debug!("using sox from nix store {}", sox_bin);
            (Path::new(sox_bin).join("play"), Path::new(sox_bin).join("sox"))
        } else {
            ("play".into(), "sox".into())
        };

        let mut player = match target {
            SoxTarget::Play => Command::new(&play)
                .args(input_args)
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .context(SpawnSox { program: play })?,
            SoxTarget::File(outfile) => Command::new(&sox)
                .args(input_args)
                .arg(outfile)
                .stdin(Stdio::piped())
                .spawn()
                .context(SpawnSox { program: sox })?,
        };

        let audio_stream = player.stdin.take().expect("Used stdin(Stdio::piped())");

        Ok(Self {
            player,
            stream: StreamSink::new(audio_stream),
        })
    }

    /// Close the stream and wait for sox to drain it.
    pub fn finish(self) -> Result<(), PlayError> {
        let SoxSink { mut player, stream } = self;
        let (audio_stream, error) = stream.into_parts();
        // sox exits once its input is closed
        drop(audio_stream);
        let status = player.wait().context(WaitSox)?;
        if let Some(source) = error {
            return Err(PlayError::WriteAudio { source });
        }
        if !status.success() {
            return Err(PlayError::SoxFailed { status });
        }
        Ok(())
    }
}

impl Sink for SoxSink {
    fn write(&mut self, buffer: &AudioBuffer) -> bool {
        self.stream.write(buffer)
    }
}
