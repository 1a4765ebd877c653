pub mod article_handlers;
pub mod comment_handlers;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod params;
pub mod product_handlers;
pub mod routes;

pub use error::{classify, ApiError, ErrorResponse, FailureClass};
pub use handlers::AppState;
pub use routes::*;
