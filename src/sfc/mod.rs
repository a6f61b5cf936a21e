pub mod adapter;
pub mod stubs;
pub mod traits;
