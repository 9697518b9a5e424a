//! CLI command implementations

pub mod fetch;
pub mod load;
pub mod paths;
pub mod vars;

pub use fetch::execute as fetch;
pub use load::execute as load;
pub use paths::{cache_path, product_path, resolve};
pub use vars::execute as vars;
