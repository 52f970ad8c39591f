// Order strategies built on the request pipeline
pub mod strategies;

// Wiring
pub mod system;
