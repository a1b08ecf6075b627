//! Zero-sized repository structs, one per table group.

pub mod counter_repo;
pub mod feedback_repo;
pub mod queue_entry_repo;
pub mod queue_event_repo;
pub mod session_repo;
pub mod stats_repo;
pub mod user_repo;

pub use counter_repo::CounterRepo;
pub use feedback_repo::FeedbackRepo;
pub use queue_entry_repo::QueueEntryRepo;
pub use queue_event_repo::QueueEventRepo;
pub use session_repo::SessionRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;
