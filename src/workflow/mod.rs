pub mod bill_flow;
pub mod group_ctx;

pub use bill_flow::{narrate, BillFlow, GroupOutcome};
pub use group_ctx::GroupCtx;
