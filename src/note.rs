// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note is.

use std::fmt;

/// Number of scale degrees in one octave.
pub const NOTES_PER_OCTAVE: usize = 7;

/// Number of octaves covered by the frequency tables.
pub const OCTAVES: usize = 6;

/// Number of entries in every note table, including the rest at index 0.
pub const TOTAL_NOTES: usize = NOTES_PER_OCTAVE * OCTAVES + 1;

/// A "note" is just an index into the frequency tables.
///
/// Index 0 is the rest (silence). Indices 1 to 42 are six octaves of the seven
/// natural scale degrees, starting with C0. A value of this type is always in range,
/// so table lookups never need to check it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NoteIndex(u8);

/// The name of a scale degree in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Degree {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Degree {
    /// All degrees in the order they appear within an octave.
    pub const ALL: [Degree; NOTES_PER_OCTAVE] = [
        Degree::C,
        Degree::D,
        Degree::E,
        Degree::F,
        Degree::G,
        Degree::A,
        Degree::B,
    ];

    /// Position of the degree within an octave, C being 0.
    pub fn position(self) -> usize {
        match self {
            Degree::C => 0,
            Degree::D => 1,
            Degree::E => 2,
            Degree::F => 3,
            Degree::G => 4,
            Degree::A => 5,
            Degree::B => 6,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Degree::C => 'C',
            Degree::D => 'D',
            Degree::E => 'E',
            Degree::F => 'F',
            Degree::G => 'G',
            Degree::A => 'A',
            Degree::B => 'B',
        }
    }

    fn from_letter(letter: char) -> Option<Degree> {
        Degree::ALL
            .iter()
            .copied()
            .find(|d| d.letter() == letter.to_ascii_uppercase())
    }
}

impl NoteIndex {
    /// The silent note.
    pub const REST: NoteIndex = NoteIndex(0);
    /// The highest note, B5.
    pub const MAX: NoteIndex = NoteIndex((TOTAL_NOTES - 1) as u8);
    /// The A above middle C.
    pub const A4: NoteIndex = NoteIndex((4 * NOTES_PER_OCTAVE + 5 + 1) as u8);

    /// Convert a raw index to a note, returning `None` if it is out of range.
    pub fn try_from_index(index: usize) -> Option<NoteIndex> {
        if index < TOTAL_NOTES {
            Some(NoteIndex(index as u8))
        } else {
            None
        }
    }

    /// Convert a raw index to a note, clamping it to the valid range.
    ///
    /// # Examples
    ///
    /// ```
    /// use binaural_beat::note::*;
    ///
    /// assert_eq!(NoteIndex::clamped(-3), NoteIndex::REST);
    /// assert_eq!(NoteIndex::clamped(100), NoteIndex::MAX);
    /// assert_eq!(NoteIndex::clamped(29).index(), 29);
    /// ```
    pub fn clamped(index: i64) -> NoteIndex {
        NoteIndex(index.max(0).min(NoteIndex::MAX.0 as i64) as u8)
    }

    /// Convert a note from standard notation to a table index.
    /// Returns `None` if the octave is not covered by the tables.
    ///
    /// # Examples
    ///
    /// ```
    /// use binaural_beat::note::*;
    ///
    /// assert_eq!(NoteIndex::try_named(Degree::C, 0).map(NoteIndex::index), Some(1));
    /// assert_eq!(NoteIndex::try_named(Degree::A, 4).map(NoteIndex::index), Some(34));
    /// assert_eq!(NoteIndex::try_named(Degree::C, 6), None);
    /// ```
    pub fn try_named(degree: Degree, octave: usize) -> Option<NoteIndex> {
        if octave < OCTAVES {
            Some(NoteIndex(
                (octave * NOTES_PER_OCTAVE + degree.position() + 1) as u8,
            ))
        } else {
            None
        }
    }

    /// Parse a label of the format `<letter><octave>`, or `R` for the rest.
    ///
    /// # Examples
    ///
    /// ```
    /// # use binaural_beat::note::*;
    ///
    /// assert_eq!(NoteIndex::named_str("A4"), NoteIndex::try_named(Degree::A, 4));
    /// assert_eq!(NoteIndex::named_str("a4"), NoteIndex::try_named(Degree::A, 4));
    /// assert_eq!(NoteIndex::named_str("R"), Some(NoteIndex::REST));
    /// assert_eq!(NoteIndex::named_str("H2"), None);
    /// ```
    pub fn named_str(label: &str) -> Option<NoteIndex> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("r") {
            return Some(NoteIndex::REST);
        }
        let mut chars = label.chars();
        let degree = Degree::from_letter(chars.next()?)?;
        let octave = chars.as_str().parse().ok()?;
        NoteIndex::try_named(degree, octave)
    }

    /// Return the note index as a plain table offset.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Move the note by `delta` scale degrees, clamping at both ends of the table.
    pub fn step(self, delta: i64) -> NoteIndex {
        NoteIndex::clamped(self.0 as i64 + delta)
    }

    pub fn is_rest(self) -> bool {
        self == NoteIndex::REST
    }

    /// Scale degree and octave of this note, `None` for the rest.
    pub fn degree(self) -> Option<(Degree, usize)> {
        if self.is_rest() {
            None
        } else {
            let offset = self.index() - 1;
            Some((
                Degree::ALL[offset % NOTES_PER_OCTAVE],
                offset / NOTES_PER_OCTAVE,
            ))
        }
    }
}

impl fmt::Display for NoteIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.degree() {
            None => write!(f, "R"),
            Some((degree, octave)) => write!(f, "{}{}", degree.letter(), octave),
        }
    }
}

/// Display labels of all notes, built once and only looked up afterwards.
#[derive(Debug, Clone)]
pub struct NoteLabels {
    labels: Vec<String>,
}

impl NoteLabels {
    pub fn new() -> Self {
        let labels = (0..TOTAL_NOTES)
            .filter_map(NoteIndex::try_from_index)
            .map(|note| note.to_string())
            .collect();
        Self { labels }
    }

    pub fn label(&self, note: NoteIndex) -> &str {
        &self.labels[note.index()]
    }
}

impl Default for NoteLabels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn labels() {
        let labels = NoteLabels::new();
        assert_eq!(labels.label(NoteIndex::REST), "R");
        assert_eq!(labels.label(NoteIndex::clamped(1)), "C0");
        assert_eq!(labels.label(NoteIndex::clamped(7)), "B0");
        assert_eq!(labels.label(NoteIndex::clamped(8)), "C1");
        assert_eq!(labels.label(NoteIndex::clamped(29)), "C4");
        assert_eq!(labels.label(NoteIndex::clamped(34)), "A4");
        assert_eq!(NoteIndex::try_named(Degree::A, 4), Some(NoteIndex::A4));
        assert_eq!(labels.label(NoteIndex::MAX), "B5");
    }

    #[test]
    fn labels_parse_back() {
        let labels = NoteLabels::new();
        for index in 0..TOTAL_NOTES {
            let note = NoteIndex::try_from_index(index).unwrap();
            assert_eq!(NoteIndex::named_str(labels.label(note)), Some(note));
        }
    }

    #[test]
    fn step_clamps() {
        assert_eq!(NoteIndex::REST.step(-1), NoteIndex::REST);
        assert_eq!(NoteIndex::MAX.step(1), NoteIndex::MAX);
        assert_eq!(NoteIndex::REST.step(1).index(), 1);
        assert_eq!(NoteIndex::try_from_index(TOTAL_NOTES), None);
    }
}
