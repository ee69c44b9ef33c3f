mod registry;
mod user_id;

pub use registry::VisibilityRegistry;
pub use user_id::UserId;
