pub mod core;
pub mod reports;
pub mod review;
pub mod submissions;
