pub mod config;
pub mod fields;
pub mod params;
pub mod ticket;
