//! 唯一标识生成器（IdGenerator）
//!
//! 总线本身不生成 ID，而是在构造时注入一个生成器，用于事件 ID 与缺省的事务 ID。
//! 约定：
//! - 每次调用返回一个新的唯一字符串；
//! - 永不返回空字符串（空串在总线内部表示“未设置”）；
//! - 可被多个线程并发调用。
//!
use parking_lot::Mutex;
use std::fmt;
use tracing::warn;
use ulid::{MonotonicError, Ulid};
use uuid::Uuid;

/// 唯一标识生成器
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// 任意 `Fn() -> String` 闭包都可直接作为生成器使用
impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// 基于 UUID v4 的随机 ID
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// 单调递增的 ULID
///
/// 同一毫秒内依次递增随机部分，保证同一生成器产出的 ID 按字典序有序。
/// 例外：同一毫秒内随机部分溢出时，记一条 `warn!` 并改用 `Ulid::new()`，
/// 这一个 ID 仍然唯一，但不再保证排在前一个之后。
pub struct UlidGenerator {
    inner: Mutex<ulid::Generator>,
}

impl UlidGenerator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ulid::Generator::new()),
        }
    }
}

impl Default for UlidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UlidGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UlidGenerator").finish_non_exhaustive()
    }
}

impl IdGenerator for UlidGenerator {
    fn generate(&self) -> String {
        let next = self.inner.lock().generate();
        monotonic_or_random(next).to_string()
    }
}

fn monotonic_or_random(next: Result<Ulid, MonotonicError>) -> Ulid {
    next.unwrap_or_else(|err| {
        warn!(error = %err, "ulid overflowed, monotonic order not kept");
        Ulid::new()
    })
}
