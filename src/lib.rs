pub mod core;
pub mod api;
pub mod blastinput;
pub mod error;
