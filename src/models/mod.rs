pub mod playlist;

pub use playlist::*;
