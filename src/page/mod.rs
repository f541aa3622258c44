pub mod host;
pub mod selector;
pub mod simulated;
