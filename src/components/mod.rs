// Export components
pub mod ews;
pub mod inbox;

pub use ews::Session;
pub use inbox::probe_inbox;
