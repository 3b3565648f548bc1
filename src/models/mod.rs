pub mod loaders;
pub mod signal;

pub use loaders::{load_names, parse_names};
pub use signal::{ResultSignal, WorkItem};
