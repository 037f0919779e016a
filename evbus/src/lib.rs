//! 进程内发布/订阅总线（evbus）
//!
//! 生产者向具名主题发布事件；以正则模式注册的处理器接收名称命中的主题上的事件。
//! - 主题（`register_topics`）与处理器（`register_handler`）可按任意顺序注册，
//!   任一侧变化时自动重新推导订阅关系；
//! - 发布（`emit`）在调用方线程上同步投递，全部处理器返回后才返回；
//! - 事件 ID 与缺省事务 ID 由构造时注入的 `IdGenerator` 生成。
//!
//! 本 crate 纯内存、单进程，不涉及持久化、重试与跨进程投递。
//!
//! 典型用法：
//! ```rust
//! use evbus::{Bus, EmitContext, Event, Handler, UuidGenerator};
//!
//! let bus = Bus::builder().id_generator(UuidGenerator).build()?;
//! bus.register_topics(["order.created", "order.shipped"]);
//! bus.register_handler(
//!     "audit",
//!     Handler::from_fn(r"^order\.", |_ctx: &EmitContext, e: &Event| {
//!         println!("{} {}", e.topic(), e.id());
//!     }),
//! )?;
//!
//! let event = bus.emit(&EmitContext::default(), "order.created", 42u64)?;
//! assert_eq!(event.data::<u64>(), Some(&42));
//! # Ok::<(), evbus::BusError>(())
//! ```
//!
pub mod bus;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod handler;
pub mod id;

mod dispatcher;
mod registry;

pub use bus::{Bus, BusBuilder};
pub use config::BusConfig;
pub use context::EmitContext;
pub use error::{BusError, BusResult, HandlerFailure};
pub use event::{EmitOption, Event, Payload};
pub use handler::{EventHandler, Handler};
pub use id::{IdGenerator, UlidGenerator, UuidGenerator};
pub use registry::resolver::matches;
