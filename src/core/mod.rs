pub mod booking;
pub mod jobs;
pub mod settings;
pub mod store;
pub mod terminal;
pub mod vault;
