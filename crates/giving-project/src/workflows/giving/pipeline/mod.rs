//! Donor solicitation pipeline: TODO -> ASKING -> PLEDGED -> COMPLETED.

mod service;
mod transitions;

pub use service::{DonorPipelineService, PipelineReceipt};
pub use transitions::{PipelineAction, TransitionError};
