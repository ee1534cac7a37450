//! Command-line interface for case-forge.
//!
//! Provides commands for synthesizing cases, validating datasets and
//! previewing generation prompts.

mod commands;

pub use commands::{
    build_config, parse_cli, run, run_with_cli, Cli, Commands, PromptArgs, SynthesizeArgs,
    ValidateArgs,
};
