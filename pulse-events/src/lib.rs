//! 进程内事件注册表（pulse-events）
//!
//! 提供同步、尽力而为的进程内发布/订阅构件：
//! - 监听器（`listener`）：单方法能力抽象，闭包即可实现
//! - 事件处理器（`processor`）：单个事件的键控监听器集合与触发
//! - 事件集合（`collection`）：按事件键组织多个处理器并路由触发
//! - 事件句柄（`handle`）：注册时返回的类型化能力对象
//! - 配置（`config`）与统一错误（`error`）
//!
//! 不涉及跨进程投递、持久化与重放；触发在调用线程上同步执行全部监听器后返回。
//!
//! 典型用法：
//! ```rust
//! use pulse_events::{EventCollection, listener_fn};
//! use std::sync::{Arc, Mutex};
//!
//! let events = EventCollection::<&str>::new();
//! let click = events.register_event::<u32, i32>("click");
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let processor = events.processor(&click).unwrap();
//! processor.register_listener(1, {
//!     let seen = seen.clone();
//!     listener_fn(move |p: &i32| seen.lock().unwrap().push(*p))
//! });
//!
//! events.trigger(&"click", &42).unwrap();
//! events.trigger_handle(&click, &7).unwrap();
//! assert_eq!(*seen.lock().unwrap(), vec![42, 7]);
//! ```
//!
pub mod collection;
pub mod config;
pub mod error;
pub mod handle;
pub mod listener;
pub mod processor;

pub use collection::EventCollection;
pub use config::{FailurePolicy, ProcessorConfig};
pub use error::{EventError, EventResult, ListenerFailure};
pub use handle::EventHandle;
pub use listener::{EventListener, InfallibleListener, listener_fn};
pub use processor::{EventProcessor, KeyLabel, debug_label};
