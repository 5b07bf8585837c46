pub mod chunk;

pub use chunk::split_message;
