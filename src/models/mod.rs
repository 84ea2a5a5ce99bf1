mod forum;
mod post;
mod service;
mod thread;
mod user;

pub use forum::*;
pub use post::*;
pub use service::*;
pub use thread::*;
pub use user::*;
