//! Small helpers shared across modules.

pub mod html;
pub mod mime;
