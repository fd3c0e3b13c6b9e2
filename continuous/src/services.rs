pub mod consecutive;
pub mod dominant;
pub mod tasks;
pub mod writer;
