pub mod params;
pub mod types;
