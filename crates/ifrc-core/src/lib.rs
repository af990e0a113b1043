//! Pipeline orchestration for the IFRC GO connector.

pub mod pipeline;
pub mod state;

pub use pipeline::Pipeline;
pub use state::{RunState, STATE_FILE_NAME};
