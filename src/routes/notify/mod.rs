mod handler;
mod model;

pub use handler::notify;
pub use model::{NotifyRequest, NotifyResponse};
