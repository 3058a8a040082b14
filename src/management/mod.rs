mod auth;
mod locks;
mod users;

pub use auth::TokenManager;
pub use auth::UserToken;
pub use auth::is_expired;
pub use locks::UserLocks;
pub use users::FileUserStore;
pub use users::MemoryUserStore;
pub use users::UserStore;
