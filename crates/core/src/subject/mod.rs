//! Subjects (identifiers to look up) and their insertion-ordered store.

mod store;
mod types;

pub use store::SubjectStore;
pub use types::{IdType, Subject, SubjectKey};
