pub mod locality;
pub mod record;

pub use locality::*;
pub use record::*;
