// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Frequency tables assigning a pitch to every note of the keyboard.

use crate::note::*;

/// Frequency of the A above middle C in standard concert tuning (ISO 16).
pub const A440: f64 = 440.0;

/// The rule used for deriving the pitch of all scale degrees from the A of each octave.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TuningKind {
    /// Twelve-tone equal temperament.
    EqualTemperament,
    /// Pure fifths, expressed as rational ratios relative to A.
    Pythagorean,
}

impl TuningKind {
    /// The other tuning.
    pub fn toggled(self) -> TuningKind {
        match self {
            TuningKind::EqualTemperament => TuningKind::Pythagorean,
            TuningKind::Pythagorean => TuningKind::EqualTemperament,
        }
    }

    /// Frequency ratio of a scale degree relative to the A of the same octave.
    ///
    /// # Examples
    ///
    /// ```
    /// use binaural_beat::note::Degree;
    /// use binaural_beat::tuning::TuningKind;
    ///
    /// assert_eq!(TuningKind::Pythagorean.ratio(Degree::G), 8.0 / 9.0);
    /// assert_eq!(TuningKind::EqualTemperament.ratio(Degree::A), 1.0);
    /// ```
    pub fn ratio(self, degree: Degree) -> f64 {
        match self {
            TuningKind::EqualTemperament => {
                let semitones = match degree {
                    Degree::C => -9.0,
                    Degree::D => -7.0,
                    Degree::E => -5.0,
                    Degree::F => -4.0,
                    Degree::G => -2.0,
                    Degree::A => 0.0,
                    Degree::B => 2.0,
                };
                2.0f64.powf(semitones / 12.0)
            }
            TuningKind::Pythagorean => match degree {
                Degree::C => 16.0 / 27.0,
                Degree::D => 2.0 / 3.0,
                Degree::E => 3.0 / 4.0,
                Degree::F => 64.0 / 81.0,
                Degree::G => 8.0 / 9.0,
                Degree::A => 1.0,
                Degree::B => 9.0 / 8.0,
            },
        }
    }
}

impl Default for TuningKind {
    fn default() -> Self {
        TuningKind::EqualTemperament
    }
}

/// Frequencies in Hz for every note index, computed once from a reference pitch.
///
/// # Examples
///
/// ```
/// use binaural_beat::note::*;
/// use binaural_beat::tuning::*;
///
/// let table = FrequencyTable::new(A440, TuningKind::EqualTemperament);
/// assert_eq!(table.frequency(NoteIndex::REST), 0.0);
/// assert_eq!(table.frequency(NoteIndex::try_named(Degree::A, 0).unwrap()), 27.5);
/// assert_eq!(table.frequency(NoteIndex::try_named(Degree::A, 4).unwrap()), 440.0);
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    kind: TuningKind,
    frequencies: [f64; TOTAL_NOTES],
}

impl FrequencyTable {
    /// Build the table for the given frequency of the A above middle C.
    ///
    /// The A of octave `k` is `reference / 16 * 2^k`, all other degrees are derived
    /// from it using the ratios of `kind`.
    pub fn new(reference_pitch: f64, kind: TuningKind) -> Self {
        let mut frequencies = [0.0; TOTAL_NOTES];
        let mut anchor = reference_pitch / 16.0;
        for octave in 0..OCTAVES {
            for &degree in Degree::ALL.iter() {
                if let Some(note) = NoteIndex::try_named(degree, octave) {
                    frequencies[note.index()] = anchor * kind.ratio(degree);
                }
            }
            anchor *= 2.0;
        }
        Self { kind, frequencies }
    }

    pub fn kind(&self) -> TuningKind {
        self.kind
    }

    /// Return the frequency of a note. The rest is always 0 Hz.
    pub fn frequency(&self, note: NoteIndex) -> f64 {
        self.frequencies[note.index()]
    }
}

/// The tables for both tuning systems, built together at engine startup.
#[derive(Debug, Clone)]
pub struct Tunings {
    equal: FrequencyTable,
    pythagorean: FrequencyTable,
}

impl Tunings {
    pub fn new(reference_pitch: f64) -> Self {
        Self {
            equal: FrequencyTable::new(reference_pitch, TuningKind::EqualTemperament),
            pythagorean: FrequencyTable::new(reference_pitch, TuningKind::Pythagorean),
        }
    }

    pub fn table(&self, kind: TuningKind) -> &FrequencyTable {
        match kind {
            TuningKind::EqualTemperament => &self.equal,
            TuningKind::Pythagorean => &self.pythagorean,
        }
    }
}

impl Default for Tunings {
    fn default() -> Self {
        Tunings::new(A440)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn octave_anchors() {
        let table = FrequencyTable::new(A440, TuningKind::EqualTemperament);
        for octave in 0..OCTAVES {
            let a = NoteIndex::try_named(Degree::A, octave).unwrap();
            assert_eq!(table.frequency(a), 27.5 * 2.0f64.powi(octave as i32));
        }
        assert_eq!(
            table.frequency(NoteIndex::try_named(Degree::A, 5).unwrap()),
            880.0
        );
    }

    #[test]
    fn rest_is_silent() {
        for &reference in [440.0, 432.0, 415.3].iter() {
            let tunings = Tunings::new(reference);
            for &kind in [TuningKind::EqualTemperament, TuningKind::Pythagorean].iter() {
                assert_eq!(tunings.table(kind).frequency(NoteIndex::REST), 0.0);
                assert_eq!(tunings.table(kind).kind(), kind);
            }
        }
    }

    #[test]
    fn pythagorean_ratios() {
        for &reference in [440.0, 432.0].iter() {
            let table = FrequencyTable::new(reference, TuningKind::Pythagorean);
            for octave in 0..OCTAVES {
                let anchor = reference / 16.0 * 2.0f64.powi(octave as i32);
                let c = NoteIndex::try_named(Degree::C, octave).unwrap();
                let b = NoteIndex::try_named(Degree::B, octave).unwrap();
                assert!(close(table.frequency(c), anchor * 16.0 / 27.0));
                assert!(close(table.frequency(b), anchor * 9.0 / 8.0));
            }
        }
    }

    #[test]
    fn equal_temperament_semitones() {
        let table = FrequencyTable::new(A440, TuningKind::EqualTemperament);
        let c4 = table.frequency(NoteIndex::try_named(Degree::C, 4).unwrap());
        let b4 = table.frequency(NoteIndex::try_named(Degree::B, 4).unwrap());
        assert!(close(c4, 261.625_565_300_598_6));
        assert!(close(b4, 493.883_301_256_124));
    }

    #[test]
    fn tables_ascend() {
        let tunings = Tunings::default();
        for &kind in [TuningKind::EqualTemperament, TuningKind::Pythagorean].iter() {
            let table = tunings.table(kind);
            for index in 1..TOTAL_NOTES {
                let lower = NoteIndex::clamped(index as i64 - 1);
                let upper = NoteIndex::clamped(index as i64);
                assert!(table.frequency(lower) < table.frequency(upper));
            }
        }
    }
}
