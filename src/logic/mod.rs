pub mod comments;
pub mod pagination;
pub mod schemas;
pub mod shape;

pub use comments::*;
pub use pagination::*;
pub use schemas::Payload;
pub use shape::*;
