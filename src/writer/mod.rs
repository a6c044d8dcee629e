//! Back end: `Program` in, source text (and an optional rename mapping) out.
//!
//! No validation happens here; feed it programs that went through
//! [`crate::processor::parse`] or were built with care.
pub mod minify;
pub mod source;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Program;
use crate::processor::context::Context;
pub use minify::Mapping;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Rename private identifiers before rendering.
    pub minify: bool,
    /// Render comments, no-op lines and headers.
    pub comments: bool,
    /// Strip optional whitespace.
    pub optimize_space: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generated {
    pub code: String,
    /// Present exactly when `minify` was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Mapping>,
}

pub fn generate(mut program: Program, options: &GenerateOptions) -> Generated {
    let mapping = if options.minify {
        let context = Context::from_program(&program);
        Some(minify::minify(&context, &mut program))
    } else {
        None
    };
    let code = source::generate_code(&program, options);
    debug!(bytes = code.len(), minified = options.minify, "generated source");
    Generated { code, mapping }
}
