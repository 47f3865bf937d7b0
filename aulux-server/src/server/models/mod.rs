mod attendance;
mod notifications;
mod requests;
mod session;

pub use attendance::*;
pub use notifications::*;
pub use requests::*;
pub use session::*;
