// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `binaural` - play two tones, one per ear, and explore the beat between them.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use log::{error, info};
use structopt::StructOpt;

use binaural_beat::control::{parse_note, parse_sample_rate, Intent};
use binaural_beat::engine::{EngineConfig, SynthesisEngine};
use binaural_beat::note::NoteIndex;
use binaural_beat::oscillator::Waveform;
use binaural_beat::output::PlayError;
use binaural_beat::play::{self, SamplerInfo};
use binaural_beat::shared::Controller;
use binaural_beat::tuning::TuningKind;

const HELP: &str = "\
up/down  move both ears one note
w/s      raise/lower the left ear by 0.1 Hz
a/d      raise/lower the right ear by 0.1 Hz
z/x/c/v  sine, triangle, square, saw
b        toggle between equal and pythagorean tuning
n        toggle noise
q        quit";

#[derive(Debug, StructOpt)]
#[structopt(name = "binaural", about = "Exploring binaural beats")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// Frequency of the A above middle C in Hz.
    #[structopt(long, default_value = "440")]
    reference_pitch: f64,

    #[structopt(long, default_value = "48000", parse(try_from_str = parse_sample_rate))]
    sample_rate: u32,

    /// Samples rendered at once. Smaller buffers react faster to commands.
    #[structopt(long, default_value = "512")]
    buffer_size: usize,

    /// Largest allowed beat frequency in Hz.
    #[structopt(long, default_value = "14")]
    max_beat: i32,

    /// Length of the cross-fade between two pitches, in samples.
    #[structopt(long, default_value = "1000")]
    transition_steps: u32,

    /// One of sine, triangle, square or saw.
    #[structopt(long, default_value = "sine")]
    waveform: Waveform,

    /// Either equal or pythagorean.
    #[structopt(long, default_value = "equal")]
    tuning: TuningKind,

    /// Start with the noise floor switched on.
    #[structopt(long)]
    noise: bool,

    /// The note both ears start on, e.g. A4, or R for silence.
    #[structopt(long, default_value = "A4", parse(try_from_str = parse_note))]
    start_note: NoteIndex,

    /// Output file (any sox-supported format). Played interactively if not given.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Length of the rendered file in seconds.
    #[structopt(long, default_value = "10")]
    duration: f64,
}

impl Opt {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            reference_pitch: self.reference_pitch,
            max_beat: self.max_beat,
            transition_steps: self.transition_steps,
            start_note: self.start_note,
            waveform: self.waveform,
            tuning: self.tuning,
            noise: self.noise,
            ..EngineConfig::default()
        }
    }

    fn sampler_info(&self) -> SamplerInfo {
        SamplerInfo {
            sample_rate: self.sample_rate,
            buffer_size: self.buffer_size,
        }
    }
}

/// Read commands from stdin until `q` or the end of input.
fn interact(controller: &Controller, info: SamplerInfo) {
    // long enough for the audio thread to publish the effect of a command
    let settle = Duration::from_secs_f64(2.0 * info.buffer_size as f64 / info.sample_rate as f64);
    println!("{}\n", HELP);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                error!("Failed to read command: {}", err);
                return;
            }
        };
        for word in line.split_whitespace() {
            match word.parse::<Intent>() {
                Ok(Intent::Quit) => return,
                Ok(intent) => {
                    if !controller.send(intent) {
                        info!("{:?} was dropped", intent);
                    }
                }
                Err(err) => println!("{}", err),
            }
        }
        thread::sleep(settle);
        println!("{}\n", controller.report());
    }
}

fn run(opt: Opt) -> Result<(), PlayError> {
    let engine = SynthesisEngine::new(&opt.engine_config());
    let info = opt.sampler_info();
    match opt.output {
        Some(ref path) => {
            play::render_to_file(engine, info, path, opt.duration)?;
        }
        None => {
            play::play_interactive(engine, info, |controller| interact(controller, info))?;
        }
    }
    Ok(())
}

fn main() {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).unwrap();

    if let Err(err) = run(opt) {
        error!("{}", err);
        process::exit(1);
    }
}
