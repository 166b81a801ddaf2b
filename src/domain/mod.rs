pub mod booking;
pub mod package;
pub mod user;

pub use booking::*;
pub use package::*;
pub use user::*;
