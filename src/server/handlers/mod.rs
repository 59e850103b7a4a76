pub mod location;
pub mod restaurants;
