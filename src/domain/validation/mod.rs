pub mod order_validator;

pub use order_validator::{NumericInput, OrderValidator};
