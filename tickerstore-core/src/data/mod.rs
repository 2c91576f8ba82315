//! Market data providers.

pub mod provider;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;
pub mod yahoo;

pub use provider::{DataProvider, ProviderError, RawBar, RawNewsItem};
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedProvider;
pub use yahoo::YahooProvider;
