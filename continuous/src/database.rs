pub mod continuous;
pub mod init;
pub mod memory;
pub mod open_interest;
