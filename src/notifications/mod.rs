//! Transition alerts and the memory behind them.

pub mod memory;
pub mod notifier;
pub mod sink;

pub use memory::{MemoryStore, NotificationMemory, RedisMemoryStore};
pub use notifier::{format_alert, SignalTransitionNotifier};
pub use sink::{NotificationSink, TelegramSink};
