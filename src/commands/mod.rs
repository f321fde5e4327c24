pub mod analyze;
pub mod count;
pub mod init;
pub mod models;
pub mod sample;
pub mod serve;
pub mod usage;
