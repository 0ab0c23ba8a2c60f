pub mod app_state;
pub mod session_registry;

pub use app_state::AppState;
pub use session_registry::SessionRegistry;
