pub use locations_core::{contract, record, retry, seed};
