//! Database entities module

pub mod calculation;
pub mod session_token;
pub mod user;

pub use calculation::Entity as Calculation;
pub use session_token::Entity as SessionToken;
pub use user::Entity as User;
