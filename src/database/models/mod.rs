pub mod user;
pub mod subscription;
pub mod sent_alert;

pub use user::*;
pub use subscription::*;
pub use sent_alert::*;
