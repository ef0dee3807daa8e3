pub mod dag;
pub mod error;
pub mod export;
pub mod parse;
pub mod pipeline;
pub mod validate;
pub mod wasm;
