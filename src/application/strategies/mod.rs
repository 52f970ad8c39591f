pub mod grid;
pub mod oco;
pub mod orders;
pub mod twap;

pub use grid::{GridExecutor, GridReport, grid_levels};
pub use oco::{OcoExecutor, OcoReport};
pub use orders::{OrderExecutor, OrderKind, OrderRequest};
pub use twap::{SliceOutcome, TwapExecutor, TwapReport};
