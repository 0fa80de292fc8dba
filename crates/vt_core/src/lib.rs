//! # vt_core - Veritas Core Primitives
//!
//! 核心原语层，定义 Interaction 实体、ID 生成策略、全局错误分类。
//! 此 crate 是整个项目的基础依赖，不依赖其他业务 crate。

pub mod error;
pub mod entity;
pub mod id;

pub use error::{ErrorKind, Result, ResultExt, VeritasError};
pub use entity::{Interaction, InteractionId};
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
