//! Shared utility functions for case-forge.
//!
//! This module provides common utilities used across multiple modules,
//! including JSON extraction from LLM responses.

pub mod json_extraction;

pub use json_extraction::{
    analyze_json_structure, content_preview, detect_truncated_json, extract_outer_object,
    JsonStructureAnalysis,
};
