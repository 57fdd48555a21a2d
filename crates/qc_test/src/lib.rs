pub mod macros;
pub mod mock;
