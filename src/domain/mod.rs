// Port interfaces
pub mod ports;

// Core trading domain
pub mod trading;

// Input validation rules
pub mod validation;

// Domain-specific error types
pub mod errors;
