pub mod movie;
pub mod session;
pub mod theme;

pub use movie::{Movie, MovieId};
pub use session::Session;
pub use theme::ThemeMode;
