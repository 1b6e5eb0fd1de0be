pub mod auth;
pub mod communication;
pub mod feedback;
pub mod loyalty;
pub mod notification;
pub mod subscription;
pub mod tier;
pub mod user;

pub use auth::auth_config;
pub use communication::communication_config;
pub use feedback::{complaint_config, feedback_config};
pub use loyalty::loyalty_config;
pub use notification::notification_config;
pub use subscription::subscription_config;
pub use tier::tier_config;
pub use user::user_config;
