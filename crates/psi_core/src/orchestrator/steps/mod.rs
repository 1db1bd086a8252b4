//! Pipeline step implementations.
//!
//! Each step handles one phase of the PSI pipeline.

mod post_process;
mod quantify;

pub use post_process::PostProcessStep;
pub use quantify::QuantifyStep;
