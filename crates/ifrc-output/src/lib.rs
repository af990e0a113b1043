//! Output stage of the IFRC GO connector.
//!
//! - [`Assembler`] resolves the rows of a scope, writes the CSV resources
//!   and derives dataset, quickchart and showcase metadata.
//! - [`Publisher`] hands the result over; [`LocalPublisher`] writes JSON
//!   manifests next to the resources.

pub mod assembler;
pub mod csv;
pub mod error;
pub mod period;
pub mod publish;
pub mod slug;

pub use assembler::Assembler;
pub use error::{AssembleError, Result};
pub use period::DateRange;
pub use publish::{LocalPublisher, PublishReceipt, Publisher};
pub use slug::slugify;
