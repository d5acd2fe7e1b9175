pub mod task_cache;

pub use task_cache::{Subscription, TaskCache, TaskSnapshot};
