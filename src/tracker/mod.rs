pub mod error;
pub mod identity;
pub mod settings;
pub mod tracker;
