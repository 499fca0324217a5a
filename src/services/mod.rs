pub mod audio;
pub mod usage;
pub mod votd;
