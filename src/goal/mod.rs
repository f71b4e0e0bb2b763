//! Savings goals and their clamped contribution handling.

mod models;
mod ops;

pub use models::Goal;
pub use ops::{add_money_to_goal, create_goal, update_goal};
