pub mod breakdown;
pub mod fit;
pub mod parse;
pub mod prompt;
