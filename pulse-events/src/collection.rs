//! 事件集合（EventCollection）
//!
//! 以事件键管理多个 [`EventProcessor`]，并将触发请求路由到对应处理器：
//! - 各处理器的监听器键/负载类型互不相同，集合内以类型擦除方式存放；
//! - 取回处理器时基于 `TypeId` 做受检向下转型，类型不符返回 `TypeMismatch`；
//! - 注册时返回 [`EventHandle`]，经由句柄的操作在编译期即确定类型。
//!
//! 触发时先克隆出已捕获泛型的触发闭包，再释放映射锁后调用，
//! 因此监听器内部可以再注册/注销/触发本集合中的事件。
//!
use crate::config::ProcessorConfig;
use crate::error::{EventError, EventResult};
use crate::handle::EventHandle;
use crate::processor::{EventProcessor, KeyLabel, debug_label};
use dashmap::DashMap;
use std::any::{Any, type_name};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, trace};

type AnyProcessor = Arc<dyn Any + Send + Sync>;

// 负载类型不符时返回 None
type TriggerFn = Arc<dyn Fn(&dyn Any) -> Option<EventResult<()>> + Send + Sync>;

struct EventSlot {
    processor: AnyProcessor,
    trigger: TriggerFn,
    processor_name: &'static str,
    payload_name: &'static str,
}

impl EventSlot {
    fn new<H, E>(processor: Arc<EventProcessor<H, E>>) -> Self
    where
        H: Eq + Hash + Send + Sync + 'static,
        E: 'static,
    {
        let trigger: TriggerFn = {
            let processor = processor.clone();

            Arc::new(move |payload: &dyn Any| {
                payload
                    .downcast_ref::<E>()
                    .map(|payload| processor.trigger(payload))
            })
        };

        Self {
            processor,
            trigger,
            processor_name: type_name::<EventProcessor<H, E>>(),
            payload_name: type_name::<E>(),
        }
    }
}

/// 按事件键组织的事件处理器集合
///
/// 事件键实现了 `Debug` 时可直接 `new`/`with_config`；否则通过
/// [`with_key_label`](Self::with_key_label) 指定键名渲染方式。
pub struct EventCollection<K> {
    events: DashMap<K, Arc<EventSlot>>,
    config: ProcessorConfig,
    key_label: KeyLabel<K>,
}

impl<K> Default for EventCollection<K>
where
    K: Eq + Hash + Debug + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_config(ProcessorConfig::default())
    }
}

impl<K> EventCollection<K>
where
    K: Eq + Hash + Debug + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// `config` 作用于经 [`register_event`](Self::register_event) 新建的处理器
    pub fn with_config(config: ProcessorConfig) -> Self {
        let label = debug_label::<K>();
        Self::with_key_label(config, move |key: &K| label(key))
    }
}

impl<K> EventCollection<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// 以自定义的事件键渲染方式构建集合（键类型无需实现 `Debug`）
    pub fn with_key_label<F>(config: ProcessorConfig, key_label: F) -> Self
    where
        F: Fn(&K) -> String + Send + Sync + 'static,
    {
        Self {
            events: DashMap::new(),
            config,
            key_label: Arc::new(key_label),
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// 注册事件：新建空处理器并存于 `key` 下
    ///
    /// 若该键已存在事件，原处理器连同其监听器一并被丢弃。
    /// 新处理器以 `Debug` 渲染监听器键；监听器键未实现 `Debug` 时，
    /// 用 [`EventProcessor::with_key_label`] 构建后交给
    /// [`register_event_with`](Self::register_event_with)。
    pub fn register_event<H, E>(&self, key: K) -> EventHandle<K, H, E>
    where
        H: Eq + Hash + Debug + Send + Sync + 'static,
        E: 'static,
    {
        self.register_event_with(key, EventProcessor::<H, E>::with_config(self.config))
    }

    /// 注册一个调用方预先构建（可能已有监听器）的处理器
    pub fn register_event_with<H, E>(
        &self,
        key: K,
        processor: EventProcessor<H, E>,
    ) -> EventHandle<K, H, E>
    where
        H: Eq + Hash + Send + Sync + 'static,
        E: 'static,
    {
        self.register_shared_event(key, Arc::new(processor))
    }

    /// 注册一个共享的处理器，调用方仍可持有并直接操作它
    pub fn register_shared_event<H, E>(
        &self,
        key: K,
        processor: Arc<EventProcessor<H, E>>,
    ) -> EventHandle<K, H, E>
    where
        H: Eq + Hash + Send + Sync + 'static,
        E: 'static,
    {
        let slot = Arc::new(EventSlot::new(processor));
        let event = (self.key_label)(&key);

        if self.events.insert(key.clone(), slot).is_some() {
            debug!(
                event = %event,
                listener_key = type_name::<H>(),
                payload = type_name::<E>(),
                "replaced event, prior listeners discarded"
            );
        } else {
            debug!(
                event = %event,
                listener_key = type_name::<H>(),
                payload = type_name::<E>(),
                "registered event"
            );
        }

        EventHandle::new(key)
    }

    /// 注销事件；键不存在时为空操作，返回是否确有移除
    pub fn unregister_event(&self, key: &K) -> bool {
        let removed = self.events.remove(key).is_some();
        if removed {
            debug!(event = %(self.key_label)(key), "unregistered event");
        }
        removed
    }

    /// 取回事件处理器（通常用于在事件加入集合后继续注册监听器）
    ///
    /// - 键不存在：`EventNotFound`
    /// - `H`/`E` 与注册时不一致：`TypeMismatch`
    pub fn get_event_processor<H, E>(&self, key: &K) -> EventResult<Arc<EventProcessor<H, E>>>
    where
        H: Eq + Hash + Send + Sync + 'static,
        E: 'static,
    {
        let slot = self.slot(key)?;

        slot.processor
            .clone()
            .downcast::<EventProcessor<H, E>>()
            .map_err(|_| EventError::TypeMismatch {
                event: (self.key_label)(key),
                expected: type_name::<EventProcessor<H, E>>(),
                found: slot.processor_name,
            })
    }

    /// 经由句柄取回事件处理器
    pub fn processor<H, E>(
        &self,
        handle: &EventHandle<K, H, E>,
    ) -> EventResult<Arc<EventProcessor<H, E>>>
    where
        H: Eq + Hash + Send + Sync + 'static,
        E: 'static,
    {
        self.get_event_processor(handle.key())
    }

    /// 以 `payload` 触发 `key` 对应的事件
    ///
    /// 调用方只需声明负载类型；监听器键类型已在注册时被捕获。
    /// 触发未注册的事件视为调用方错误，返回 `EventNotFound`。
    pub fn trigger<E>(&self, key: &K, payload: &E) -> EventResult<()>
    where
        E: 'static,
    {
        let slot = self.slot(key)?;
        trace!(event = %(self.key_label)(key), "dispatching event");

        let payload: &dyn Any = payload;
        match (slot.trigger)(payload) {
            Some(result) => result,
            None => Err(EventError::TypeMismatch {
                event: (self.key_label)(key),
                expected: type_name::<E>(),
                found: slot.payload_name,
            }),
        }
    }

    /// 触发无负载事件
    ///
    /// 仅适用于负载类型为 `()` 的事件；对其他负载类型的事件返回 `TypeMismatch`。
    /// 需要以默认负载触发时使用 [`trigger_default`](Self::trigger_default)。
    pub fn trigger_empty(&self, key: &K) -> EventResult<()> {
        self.trigger(key, &())
    }

    /// 以 `E::default()` 触发事件，`E` 须与注册时的负载类型一致
    pub fn trigger_default<E>(&self, key: &K) -> EventResult<()>
    where
        E: Default + 'static,
    {
        self.trigger(key, &E::default())
    }

    /// 经由句柄触发事件，负载类型在编译期检查
    pub fn trigger_handle<H, E>(
        &self,
        handle: &EventHandle<K, H, E>,
        payload: &E,
    ) -> EventResult<()>
    where
        H: Eq + Hash + Send + Sync + 'static,
        E: 'static,
    {
        self.processor(handle)?.trigger(payload)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains_event(&self, key: &K) -> bool {
        self.events.contains_key(key)
    }

    /// 已注册的事件键（只读视图，顺序未定义）
    pub fn registered_events(&self) -> Vec<K> {
        self.events.iter().map(|e| e.key().clone()).collect()
    }

    fn slot(&self, key: &K) -> EventResult<Arc<EventSlot>> {
        // 克隆后立即释放分片锁
        self.events
            .get(key)
            .map(|s| s.value().clone())
            .ok_or_else(|| EventError::not_found((self.key_label)(key)))
    }
}

impl<K> Debug for EventCollection<K>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let events: Vec<_> = self
            .events
            .iter()
            .map(|e| ((self.key_label)(e.key()), e.value().processor_name))
            .collect();

        f.debug_struct("EventCollection")
            .field("events", &events)
            .field("config", &self.config)
            .finish()
    }
}
