//! Reading and writing Atomese text.

pub mod dump;
pub mod load;
pub mod parser;

pub use dump::{write_sorted, write_sorted_file, write_sorted_file_with};
pub use load::{load_file, load_str};
