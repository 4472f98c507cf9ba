//! 事件处理器（EventProcessor）
//!
//! 仅负责“一个”事件的监听器集合：
//! - 以调用方选定的键注册/注销监听器，同键后写覆盖；
//! - `trigger` 同步调用当前全部监听器，按 [`FailurePolicy`] 处理失败；
//! - 内部基于 `DashMap`，所有操作只需 `&self`，可跨线程共享。
//!
//! 触发前先对监听器做快照并释放锁，因此监听器在回调中注册/注销监听器
//! 不会死锁，变更从下一次触发开始生效。
//!
use crate::config::{FailurePolicy, ProcessorConfig};
use crate::error::{EventError, EventResult, ListenerFailure};
use crate::listener::EventListener;
use dashmap::DashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 将键渲染为日志与失败报告中使用的名称
pub type KeyLabel<K> = Arc<dyn Fn(&K) -> String + Send + Sync>;

/// 以 `Debug` 形式渲染键
pub fn debug_label<K: Debug + 'static>() -> KeyLabel<K> {
    Arc::new(|key: &K| format!("{key:?}"))
}

/// 已注册的监听器，附带注册时渲染好的键名（用于日志与失败报告）
struct Registered<E> {
    label: String,
    listener: Arc<dyn EventListener<E>>,
}

/// 单个事件的监听器集合
///
/// - `K`：监听器键类型，只需可作为映射键（`Eq + Hash`）
/// - `E`：事件负载类型，`()` 表示无负载
///
/// 键实现了 `Debug` 时可直接 `new`/`with_config`；否则通过
/// [`with_key_label`](Self::with_key_label) 指定键名渲染方式。
pub struct EventProcessor<K, E> {
    listeners: DashMap<K, Arc<Registered<E>>>,
    config: ProcessorConfig,
    key_label: KeyLabel<K>,
}

impl<K, E> Default for EventProcessor<K, E>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    E: 'static,
{
    fn default() -> Self {
        Self::with_config(ProcessorConfig::default())
    }
}

impl<K, E> EventProcessor<K, E>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
    E: 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        let label = debug_label::<K>();
        Self::with_key_label(config, move |key: &K| label(key))
    }
}

impl<K, E> EventProcessor<K, E>
where
    K: Eq + Hash + Send + Sync + 'static,
    E: 'static,
{
    /// 以自定义的键名渲染方式构建处理器（键类型无需实现 `Debug`）
    pub fn with_key_label<F>(config: ProcessorConfig, key_label: F) -> Self
    where
        F: Fn(&K) -> String + Send + Sync + 'static,
    {
        Self {
            listeners: DashMap::with_capacity(config.initial_capacity),
            config,
            key_label: Arc::new(key_label),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// 注册监听器；若键已存在则替换原监听器
    pub fn register_listener<L>(&self, key: K, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.register_shared_listener(key, Arc::new(listener));
    }

    /// 注册一个已共享的监听器；若键已存在则替换原监听器
    pub fn register_shared_listener(&self, key: K, listener: Arc<dyn EventListener<E>>) {
        let label = (self.key_label)(&key);
        let entry = Arc::new(Registered {
            label: label.clone(),
            listener,
        });

        if self.listeners.insert(key, entry).is_some() {
            debug!(listener = %label, "replaced event listener");
        } else {
            debug!(listener = %label, "registered event listener");
        }
    }

    /// 注销监听器；键不存在时为空操作，返回是否确有移除
    pub fn unregister_listener(&self, key: &K) -> bool {
        match self.listeners.remove(key) {
            Some((_, entry)) => {
                debug!(listener = %entry.label, "unregistered event listener");
                true
            }
            None => false,
        }
    }

    /// 清空全部监听器，处理器本身保留
    pub fn unregister_all_listeners(&self) {
        let count = self.listeners.len();
        self.listeners.clear();
        debug!(count, "unregistered all event listeners");
    }

    /// 以 `payload` 触发事件，同步调用当前全部监听器
    ///
    /// 调用顺序未定义（取决于底层映射的遍历顺序）；无监听器时直接返回 `Ok(())`。
    /// 监听器内的 panic 不会被捕获。
    pub fn trigger(&self, payload: &E) -> EventResult<()> {
        let snapshot: Vec<Arc<Registered<E>>> =
            self.listeners.iter().map(|e| e.value().clone()).collect();
        trace!(listeners = snapshot.len(), "triggering event");

        let mut failures = Vec::new();
        for (idx, entry) in snapshot.iter().enumerate() {
            if let Err(error) = entry.listener.process_event(payload) {
                warn!(
                    listener = %entry.label,
                    error = %format!("{error:#}"),
                    "event listener failed"
                );
                failures.push(ListenerFailure::new(entry.label.clone(), error));

                if self.config.failure_policy == FailurePolicy::FailFast {
                    debug!(
                        skipped = snapshot.len() - idx - 1,
                        "aborting trigger on first listener failure"
                    );
                    break;
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EventError::ListenerFailed { failures })
        }
    }

    /// 以 `E::default()` 触发事件
    pub fn trigger_default(&self) -> EventResult<()>
    where
        E: Default,
    {
        self.trigger(&E::default())
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn contains_listener(&self, key: &K) -> bool {
        self.listeners.contains_key(key)
    }

    /// 当前已注册的监听器键（只读视图，顺序未定义）
    pub fn listener_keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.listeners.iter().map(|e| e.key().clone()).collect()
    }
}

impl<K> EventProcessor<K, ()>
where
    K: Eq + Hash + Send + Sync + 'static,
{
    /// 触发无负载事件
    pub fn trigger_empty(&self) -> EventResult<()> {
        self.trigger(&())
    }
}

impl<K, E> Debug for EventProcessor<K, E>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventProcessor")
            .field("listeners", &self.listeners.len())
            .field("config", &self.config)
            .finish()
    }
}
