mod csv;
mod sink;

pub use crate::output::csv::*;
pub use crate::output::sink::*;
