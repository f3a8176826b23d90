pub mod session_repository;

pub use session_repository::{run_expiry_sweep, InMemorySessionRepository, SessionRepository};
