pub mod source_loader;

pub use source_loader::{load_names, parse_names};
