//! CLI command handlers

pub mod commands;

pub use commands::{
    convert, memory_list, memory_show, project, reflow, samples, ConvertOptions,
};
