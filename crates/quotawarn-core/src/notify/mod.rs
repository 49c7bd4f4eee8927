//! Notification deduplication across evaluation cycles.
//!
//! Three independent channels (member, admin-about-member, admin-global)
//! share one rule: speak up only when the warning changes to something that
//! is not Ok.

pub mod dedup;
pub mod outbox;
pub mod state;
pub mod store;
pub mod types;

pub use dedup::{GlobalRepeat, NotificationDeduplicator};
pub use outbox::NotificationOutbox;
pub use state::{MemberChannel, NotificationState};
pub use store::{FileStateStore, MemoryStateStore, StateStore};
pub use types::{Notification, RecipientKind, Transition};
