// Library crate for the remindme watcher and CLI
// The binary in main.rs is a thin shell over these modules

pub mod reminder;

pub mod test_utils;
