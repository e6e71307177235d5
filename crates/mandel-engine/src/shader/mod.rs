//! Shader lifecycle: source loading, per-stage compile, program link, uniform binding.
//!
//! Compile and link failures are statuses plus human-readable logs, never errors.
//! The caller inspects [`ShaderProgram::status`] and decides whether to abort.

mod program;
mod source;
mod stage;
mod unit;

pub use program::{LinkStatus, ShaderProgram};
pub use source::{SourceError, load_source};
pub use stage::ShaderStage;
pub use unit::{CompileStatus, ShaderUnit};
