pub mod health;
pub mod queue;
