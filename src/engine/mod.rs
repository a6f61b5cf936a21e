pub mod basic;
pub mod stubs;
pub mod traits;
