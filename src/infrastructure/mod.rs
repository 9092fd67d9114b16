//! Infrastructure layer - concrete adapters behind the domain contracts

pub mod evidence;
pub mod generation;
pub mod grading;
pub mod json;
pub mod llm;
pub mod logging;
pub mod validation;
pub mod websearch;
