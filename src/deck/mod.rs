//! In-memory browse state and the persisted decision ledger.

pub mod candidate_queue;
pub mod decision_ledger;

pub use candidate_queue::CandidateQueue;
pub use decision_ledger::{AcceptOutcome, DecisionLedger, Stats};
