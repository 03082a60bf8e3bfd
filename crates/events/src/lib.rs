//! Cross-component messaging for list pages.

pub mod channel;
pub mod in_memory;
pub mod saved_filter;

pub use channel::{EventChannel, Subscription};
pub use in_memory::{InMemoryChannel, InMemoryChannelError};
pub use saved_filter::ApplySavedFilter;
