pub mod article;
pub mod comment;
pub mod common;
pub mod listing;
pub mod product;

pub use article::*;
pub use comment::*;
pub use common::*;
pub use listing::*;
pub use product::*;
