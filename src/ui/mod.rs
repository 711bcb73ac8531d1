pub mod input;
pub mod quotes;
pub mod screen;
pub mod symbols;
pub mod timer;
