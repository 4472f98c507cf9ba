use std::fmt;
use std::marker::PhantomData;

/// 事件句柄：注册事件时返回的类型化能力对象
///
/// 将事件键与该事件处理器的监听器键类型 `H`、负载类型 `E` 绑定在一起，
/// 经由句柄的查找与触发在编译期即完成类型检查：
///
/// ```compile_fail
/// use pulse_events::EventCollection;
///
/// let events = EventCollection::<&str>::new();
/// let click = events.register_event::<u32, i32>("click");
/// // 负载类型与注册时不一致，无法通过编译
/// events.trigger_handle(&click, &"not a number").unwrap();
/// ```
pub struct EventHandle<K, H, E> {
    key: K,
    _types: PhantomData<fn() -> (H, E)>,
}

impl<K, H, E> EventHandle<K, H, E> {
    pub(crate) fn new(key: K) -> Self {
        Self {
            key,
            _types: PhantomData,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn into_key(self) -> K {
        self.key
    }
}

impl<K: Clone, H, E> Clone for EventHandle<K, H, E> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<K: fmt::Debug, H, E> fmt::Debug for EventHandle<K, H, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandle")
            .field("key", &self.key)
            .field("listener_key", &std::any::type_name::<H>())
            .field("payload", &std::any::type_name::<E>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::EventCollection;

    #[test]
    fn handle_exposes_and_returns_key() {
        let events = EventCollection::<String>::new();
        let handle = events.register_event::<u8, i32>("click".to_string());
        assert_eq!(handle.key(), "click");

        let copy = handle.clone();
        assert_eq!(handle.into_key(), "click");
        assert_eq!(copy.key(), "click");
    }

    #[test]
    fn returned_key_re_registers_event() {
        let events = EventCollection::<String>::new();
        let handle = events.register_event::<u8, i32>("click".to_string());
        let key = handle.into_key();

        assert!(events.unregister_event(&key));
        let handle = events.register_event::<u8, ()>(key);
        assert!(events.processor(&handle).unwrap().is_empty());
        assert!(events.trigger_empty(handle.key()).is_ok());
    }

    #[test]
    fn debug_lists_key_and_types() {
        let events = EventCollection::<&str>::new();
        let handle = events.register_event::<u32, String>("save");
        let rendered = format!("{handle:?}");
        assert!(rendered.contains("\"save\""));
        assert!(rendered.contains("u32"));
        assert!(rendered.contains("String"));
    }
}
