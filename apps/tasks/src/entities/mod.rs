pub mod tasks;

pub use tasks::Entity as Tasks;
pub use tasks::Model as TaskRow;
