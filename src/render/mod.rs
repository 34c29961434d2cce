pub mod charts;
pub mod error;
pub mod map;
pub mod table;
