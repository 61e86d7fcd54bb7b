//! Input/output helpers.
//!
//! - CSV <-> table conversion (`table_csv`)
//! - local snapshot store / cache gate (`snapshot`)
//! - evaluation exports (`export`)

pub mod export;
pub mod snapshot;
pub mod table_csv;

pub use export::*;
pub use snapshot::*;
