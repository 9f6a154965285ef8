pub mod user;
pub mod item;
pub mod archived_item;
pub mod collection;

pub use user::User;
pub use item::{Item, ItemCategory, ItemStatus};
pub use archived_item::{ArchivedItem, RETENTION_DAYS};
pub use collection::{CollectionItem, PrintCollection};
