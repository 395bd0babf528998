//! Code generation module

mod naming;
mod serializer;
mod type_resolver;

pub use naming::*;
pub use serializer::*;
pub use type_resolver::*;
