//! Output formatting module

pub mod console;
pub mod think;
