mod backoff;
mod poller;
mod probe;

pub use backoff::Backoff;
pub use poller::{LastSeen, PollOutcome, Poller};
pub use probe::{FnProbe, Probe, QueryProbe};
