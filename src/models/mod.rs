pub mod common;
pub mod feedback;
pub mod loyalty;
pub mod notification;
pub mod pagination;
pub mod subscription;
pub mod tier;
pub mod user;

pub use common::*;
pub use feedback::*;
pub use loyalty::*;
pub use notification::*;
pub use pagination::*;
pub use subscription::*;
pub use tier::*;
pub use user::*;
