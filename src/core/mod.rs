pub mod business_hours;
pub mod errors;
pub mod services;
pub mod sweep;
pub mod traits;
