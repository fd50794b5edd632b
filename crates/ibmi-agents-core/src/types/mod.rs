//! Core types shared by the filter, the registrar and the session adapters

mod annotation;
mod tool;

pub use annotation::{AnnotationValue, Scalar};
pub use tool::{Annotations, Tool, ToolCall, ToolDescriptor};
