mod proof_push;
mod task;

pub use proof_push::*;
pub use task::*;
