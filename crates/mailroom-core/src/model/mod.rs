//! Typed shapes returned by the remote procedures
//!
//! The database owns every invariant; these types only default missing
//! optional fields so partial rows still decode.

mod billing;
mod mail;
mod notification;
mod user;

pub use billing::{
    AdminDashboardStats, BillingCycle, Subscription, SubscriptionPlan, SubscriptionStatus,
};
pub use mail::{
    ForwardRequest, MailItem, MailItemKind, MailItemStatus, MailroomData, MailroomStats,
    NewMailItem, VirtualAddress,
};
pub use notification::{Notification, NotificationKind};
pub use user::{
    KycInfo, KycStatus, KycSubmission, MailroomAssignment, ProfileUpdate, UserAuthData,
    UserFullDetails, UserProfile, UserRole,
};
