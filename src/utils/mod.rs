pub mod table;
pub mod errors;
pub mod format;
pub mod logging;

pub use table::Table;
