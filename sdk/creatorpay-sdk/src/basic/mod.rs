pub mod batch;
pub mod builder;
pub mod payer;
pub mod submit;
