pub mod builder;
pub mod defaults;
pub mod images;
pub mod runtime;
pub mod sampler;
pub mod traits;
