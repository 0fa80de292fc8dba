//! # vt_durable - Veritas Durable Storage
//!
//! Interaction 持久化底座：按 ID 的点查/创建/反馈更新，以及未解决记录扫描。
//! 记录只增不删。

pub mod interaction_store;
pub mod memory_store;

pub use interaction_store::{InteractionStore, SqliteInteractionStore, SqliteStoreConfig};
pub use memory_store::MemoryInteractionStore;
