//! Gather → (curate) → digest. Each stage is one awaited completion call.

pub mod curate;
pub mod digest;
pub mod gather;

pub use curate::Curator;
pub use digest::{Digest, DigestShape};
pub use gather::{extract_text, GatherMode, Gatherer};
