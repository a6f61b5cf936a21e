pub mod memory;
pub mod traits;
