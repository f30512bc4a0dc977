pub mod templates;
pub mod composer;

pub use templates::*;
pub use composer::*;
