//! Tee standard input to standard output and a file, keeping only the last
//! N bytes in the file.
//!
//! The stream is copied through a fixed-size [`tail::TailBuffer`]; when input
//! ends the buffer's contents are written, oldest byte first, to the
//! destination file.

pub mod error;
pub mod tail;
pub mod utils;
