pub mod database;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod memory;
pub mod notifier;
pub mod repositories;
pub mod traits;
