//! 事件（Event）与发布选项
//!
//! `Event` 是每次发布时构造的不可变值；`EmitOption` 用于在默认值填充前
//! 逐项覆盖事件字段。

mod options;
mod record;

pub use options::EmitOption;
pub use record::{Event, Payload};

pub(crate) use options::EventDraft;
