pub mod complaints;
pub mod feedbacks;
pub mod loyalty_points;
pub mod notifications;
pub mod redemptions;
pub mod subscription_tiers;
pub mod subscriptions;
pub mod users;

pub use complaints as complaint_entity;
pub use feedbacks as feedback_entity;
pub use loyalty_points as loyalty_point_entity;
pub use notifications as notification_entity;
pub use redemptions as redemption_entity;
pub use subscription_tiers as tier_entity;
pub use subscriptions as subscription_entity;
pub use users as user_entity;

pub use feedbacks::TicketStatus;
pub use notifications::{NotificationChannel, NotificationStatus, NotificationType};
pub use subscription_tiers::TierType;
pub use subscriptions::SubscriptionStatus;
pub use users::{UserRole, UserStatus};
