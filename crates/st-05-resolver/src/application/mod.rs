//! Application layer: the resolver service.

pub mod resolver;

pub use resolver::Resolver;
