//! Core types: wire records, observations, identities, commit nodes, stats.

pub mod identity;
pub mod node;
pub mod observation;
pub mod record;
pub mod stats;

pub use identity::{Identity, IdentityId};
pub use node::CommitNode;
pub use observation::Observation;
pub use record::{
    ActorRef, ChangeStatus, CommitDetail, CommitRecord, FileChange, ParentRef, Signature,
};
pub use stats::RunStats;
