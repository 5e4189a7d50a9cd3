pub mod page;

pub use page::{ElementSpec, InputSpec, PageSpec};
