pub mod attendance;
pub mod clock;
pub mod error;
pub mod geo;
pub mod ledger;
pub mod scheduler;
pub mod workflow;
