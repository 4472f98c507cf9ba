//! 事件注册表统一错误定义
//!
//! 覆盖查找失败、类型不匹配与监听器执行失败三类情况，
//! 调用方通过 `EventResult` 统一处理。
//!
use std::fmt;
use thiserror::Error;

/// 单个监听器的失败记录
pub struct ListenerFailure {
    /// 监听器键（由处理器的键名渲染函数生成，默认为 `Debug` 形式）
    pub listener: String,
    /// 监听器返回的原始错误
    pub error: anyhow::Error,
}

impl ListenerFailure {
    pub fn new(listener: impl Into<String>, error: anyhow::Error) -> Self {
        Self {
            listener: listener.into(),
            error,
        }
    }
}

impl fmt::Debug for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerFailure")
            .field("listener", &self.listener)
            .field("error", &format_args!("{:#}", self.error))
            .finish()
    }
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener={}, reason={:#}", self.listener, self.error)
    }
}

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event not found: {event}")]
    EventNotFound { event: String },

    #[error("type mismatch: event={event}, expected={expected}, found={found}")]
    TypeMismatch {
        event: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{} listener(s) failed: {}", .failures.len(), join_failures(.failures))]
    ListenerFailed { failures: Vec<ListenerFailure> },
}

impl EventError {
    pub(crate) fn not_found(event: impl Into<String>) -> Self {
        EventError::EventNotFound {
            event: event.into(),
        }
    }

    /// 若为监听器失败，返回失败明细
    pub fn failures(&self) -> &[ListenerFailure] {
        match self {
            EventError::ListenerFailed { failures } => failures,
            _ => &[],
        }
    }
}

fn join_failures(failures: &[ListenerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// 统一 Result 类型别名
pub type EventResult<T> = Result<T, EventError>;
