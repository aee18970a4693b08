pub mod diff;
pub mod driver;
pub mod sink;
pub mod source;
