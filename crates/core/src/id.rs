// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier generation.

/// Alphabet matching nanoid's default but avoiding characters awkward in
/// broker key names (`_` and `-` only, no punctuation).
const ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Generates a fresh, globally-unique job id.
///
/// Callers must not assume any particular length or charset beyond "opaque,
/// URL-safe, unique" per the data model's `id` invariant.
pub fn new_job_id() -> String {
    nanoid::nanoid!(21, &ALPHABET)
}

/// Generates a fresh worker identity of the form `host:pid:index`.
pub fn worker_identity(host: &str, pid: u32, index: usize) -> String {
    format!("{host}:{pid}:{index}")
}
