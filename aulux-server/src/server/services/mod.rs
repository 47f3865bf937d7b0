pub mod attendance_store;
pub mod classroom_source;
pub mod detection;
pub mod metrics;
pub mod notifier;
pub mod oauth_client;
pub mod roles;
pub mod session_store;

pub use attendance_store::{AttendanceRepository, InMemoryAttendanceStore, Upsert};
pub use classroom_source::{gather, ClassroomSource, GatherOptions, GoogleClassroom};
pub use notifier::{Dispatcher, NotificationDispatcher, ResendClient, TwilioClient};
pub use oauth_client::OAuthClient;
pub use roles::{AllowlistRoleProvider, RoleProvider};
pub use session_store::SessionStore;
