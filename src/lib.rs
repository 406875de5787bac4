// binaural -- a binaural beat explorer
// Copyright (C) 2022  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

// modules for making sounds
pub mod blender;
pub mod engine;
pub mod note;
pub mod oscillator;
pub mod tuning;
pub mod wave;

// talking to the outside world
pub mod control;
pub mod output;
pub mod play;
pub mod shared;
