pub mod common_types;
pub mod decoder;
pub mod sample;
pub mod sampler;
pub mod store;
pub mod voice;
pub mod volume;
