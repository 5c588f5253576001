pub mod classifier;
pub mod df;
pub mod extract;
pub mod layout;
pub mod partitions;
