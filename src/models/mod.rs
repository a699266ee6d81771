pub mod event;
pub mod notification;
pub mod transaction;
pub mod user;

pub use event::Event;
pub use notification::{Notification, NotificationKind};
pub use transaction::{Transaction, TransactionStatus};
pub use user::{Role, User};
