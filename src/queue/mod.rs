//! Client-side upload queue: an ordered entry store, the per-entry upload
//! state machine, and the driver that sequences batches over them.

mod driver;
mod operation;
mod store;

pub use driver::{Batch, BatchSummary, QueueDriver};
pub use operation::{run as run_upload, Outcome};
pub use store::{
    FileEntryStore, Transition, PROGRESS_DISPATCHED, PROGRESS_DONE, PROGRESS_IDLE,
};
