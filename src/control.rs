// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! What the user can ask for, and how it is spelled on the command line.

use std::str::FromStr;

use snafu::Snafu;

use crate::note::NoteIndex;
use crate::oscillator::Waveform;
use crate::tuning::TuningKind;
use crate::wave::Channel;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn delta(self) -> i64 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }
}

/// A discrete request issued by the interactive side.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Intent {
    /// Move both ears one note up or down.
    NoteStep(Direction),
    /// Nudge the bias of one ear by a tenth of a Hz.
    BiasStep(Channel, Direction),
    SetWaveform(Waveform),
    SetTuning(TuningKind),
    ToggleTuning,
    ToggleNoise,
    /// Stop playing.
    Quit,
}

impl Intent {
    /// The keyboard layout of the explorer.
    ///
    /// | key            | intent                      |
    /// |----------------|-----------------------------|
    /// | `up`, `down`   | note step                   |
    /// | `w`, `s`       | left bias up, down          |
    /// | `a`, `d`       | right bias up, down         |
    /// | `z x c v`      | sine, triangle, square, saw |
    /// | `b`            | toggle tuning               |
    /// | `n`            | toggle noise                |
    /// | `q`            | quit                        |
    pub fn from_key(key: &str) -> Option<Intent> {
        let intent = match key {
            "up" => Intent::NoteStep(Direction::Up),
            "down" => Intent::NoteStep(Direction::Down),
            "w" => Intent::BiasStep(Channel::Left, Direction::Up),
            "s" => Intent::BiasStep(Channel::Left, Direction::Down),
            "a" => Intent::BiasStep(Channel::Right, Direction::Up),
            "d" => Intent::BiasStep(Channel::Right, Direction::Down),
            "z" => Intent::SetWaveform(Waveform::Sine),
            "x" => Intent::SetWaveform(Waveform::Triangle),
            "c" => Intent::SetWaveform(Waveform::Square),
            "v" => Intent::SetWaveform(Waveform::Saw),
            "b" => Intent::ToggleTuning,
            "n" => Intent::ToggleNoise,
            "q" => Intent::Quit,
            _ => return None,
        };
        Some(intent)
    }
}

/// Possible errors when parsing user input.
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ParseError {
    #[snafu(display("Unknown waveform {:?}, expected sine, triangle, square or saw", name))]
    UnknownWaveform { name: String },
    #[snafu(display("Unknown tuning {:?}, expected equal or pythagorean", name))]
    UnknownTuning { name: String },
    #[snafu(display("Invalid note {:?}, expected R or a letter and an octave from 0 to 5", label))]
    InvalidNote { label: String },
    #[snafu(display("Unknown command {:?}", command))]
    UnknownCommand { command: String },
    #[snafu(display("Invalid sample rate {:?}, expected a positive number of Hz", value))]
    InvalidSampleRate { value: String },
}

impl FromStr for Waveform {
    type Err = ParseError;

    /// ```
    /// use binaural_beat::oscillator::Waveform;
    ///
    /// assert_eq!("Triangle".parse(), Ok(Waveform::Triangle));
    /// assert!("organ".parse::<Waveform>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Waveform::ALL
            .iter()
            .copied()
            .find(|w| w.name() == name || (name == "sawtooth" && *w == Waveform::Saw))
            .ok_or(ParseError::UnknownWaveform { name })
    }
}

impl FromStr for TuningKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal" | "equal-temperament" | "12tet" => Ok(TuningKind::EqualTemperament),
            "pythagorean" => Ok(TuningKind::Pythagorean),
            other => Err(ParseError::UnknownTuning {
                name: other.to_string(),
            }),
        }
    }
}

/// Parse a note label such as `A4` or `R`.
pub fn parse_note(label: &str) -> Result<NoteIndex, ParseError> {
    NoteIndex::named_str(label).ok_or_else(|| ParseError::InvalidNote {
        label: label.to_string(),
    })
}

/// Parse a sample rate in Hz, rejecting zero.
pub fn parse_sample_rate(value: &str) -> Result<u32, ParseError> {
    match value.trim().parse::<u32>() {
        Ok(rate) if rate > 0 => Ok(rate),
        _ => Err(ParseError::InvalidSampleRate {
            value: value.to_string(),
        }),
    }
}

impl FromStr for Intent {
    type Err = ParseError;

    /// Accepts the keys of [`Intent::from_key`] as well as spelled out commands.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let command = s.trim().to_ascii_lowercase();
        if let Some(intent) = Intent::from_key(&command) {
            return Ok(intent);
        }
        if let Ok(waveform) = command.parse() {
            return Ok(Intent::SetWaveform(waveform));
        }
        if let Ok(tuning) = command.parse() {
            return Ok(Intent::SetTuning(tuning));
        }
        match command.as_str() {
            "tuning" => Ok(Intent::ToggleTuning),
            "noise" => Ok(Intent::ToggleNoise),
            "quit" | "exit" => Ok(Intent::Quit),
            _ => Err(ParseError::UnknownCommand { command }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keys() {
        assert_eq!(Intent::from_key("up"), Some(Intent::NoteStep(Direction::Up)));
        assert_eq!(
            Intent::from_key("a"),
            Some(Intent::BiasStep(Channel::Right, Direction::Up))
        );
        assert_eq!(
            Intent::from_key("s"),
            Some(Intent::BiasStep(Channel::Left, Direction::Down))
        );
        assert_eq!(Intent::from_key("v"), Some(Intent::SetWaveform(Waveform::Saw)));
        assert_eq!(Intent::from_key("Q"), None);
    }

    #[test]
    fn commands() {
        assert_eq!("Q".parse(), Ok(Intent::Quit));
        assert_eq!(" square ".parse(), Ok(Intent::SetWaveform(Waveform::Square)));
        assert_eq!("pythagorean".parse(), Ok(Intent::SetTuning(TuningKind::Pythagorean)));
        assert_eq!("noise".parse(), Ok(Intent::ToggleNoise));
        assert_eq!(
            "louder".parse::<Intent>(),
            Err(ParseError::UnknownCommand {
                command: "louder".to_string()
            })
        );
    }

    #[test]
    fn error_messages() {
        let err = "organ".parse::<Waveform>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown waveform \"organ\", expected sine, triangle, square or saw"
        );
        assert_eq!(
            parse_note("A9").unwrap_err().to_string(),
            "Invalid note \"A9\", expected R or a letter and an octave from 0 to 5"
        );
        assert_eq!(parse_note("c2"), Ok(NoteIndex::clamped(15)));
    }

    #[test]
    fn sample_rates() {
        assert_eq!(parse_sample_rate("48000"), Ok(48000));
        assert_eq!(
            parse_sample_rate("0"),
            Err(ParseError::InvalidSampleRate {
                value: "0".to_string()
            })
        );
        assert!(parse_sample_rate("-44100").is_err());
        assert!(parse_sample_rate("fast").is_err());
    }
}
