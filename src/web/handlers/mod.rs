pub mod analysis_handlers;
pub mod message_handlers;
pub mod profile_handlers;
pub mod system_handlers;

pub use analysis_handlers::*;
pub use message_handlers::*;
pub use profile_handlers::*;
pub use system_handlers::*;
