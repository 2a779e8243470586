//! Domain models for the back-office.

pub mod catalog;
pub mod order;
pub mod session;
pub mod user;

pub use catalog::{Category, Product};
pub use order::{Order, OrderItem, OrderWithItems};
pub use session::{CurrentAdmin, keys as session_keys};
pub use user::User;
