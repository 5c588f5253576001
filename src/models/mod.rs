pub mod disk;
pub mod metric;
