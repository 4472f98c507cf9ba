//! 事件监听器（EventListener）
//!
//! 单方法能力抽象：接收事件负载并处理。任意满足签名的闭包/函数都可直接作为监听器，
//! 无需继承任何基类。监听器自身的状态完全归注册方所有，注册表从不检查或修改。
//!
use std::marker::PhantomData;

/// 事件监听器：处理负载类型为 `E` 的事件
///
/// 返回 `Err` 表示该监听器处理失败，失败如何影响同一次触发中的其他监听器
/// 由 [`FailurePolicy`](crate::config::FailurePolicy) 决定。
pub trait EventListener<E>: Send + Sync {
    fn process_event(&self, payload: &E) -> anyhow::Result<()>;
}

impl<E, F> EventListener<E> for F
where
    F: Fn(&E) -> anyhow::Result<()> + Send + Sync,
{
    fn process_event(&self, payload: &E) -> anyhow::Result<()> {
        self(payload)
    }
}

/// 将不会失败的闭包包装为监听器
pub fn listener_fn<E, F>(f: F) -> InfallibleListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    InfallibleListener {
        f,
        _payload: PhantomData,
    }
}

/// 由 [`listener_fn`] 构造的监听器
pub struct InfallibleListener<E, F> {
    f: F,
    // fn(&E) 保证 Send/Sync 只取决于 F
    _payload: PhantomData<fn(&E)>,
}

impl<E, F> EventListener<E> for InfallibleListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    fn process_event(&self, payload: &E) -> anyhow::Result<()> {
        (self.f)(payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct Recorder {
        seen: Mutex<Vec<i32>>,
    }

    impl EventListener<i32> for Recorder {
        fn process_event(&self, payload: &i32) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(*payload);
            Ok(())
        }
    }

    #[test]
    fn struct_listener_receives_payload() {
        let r = Recorder {
            seen: Mutex::new(Vec::new()),
        };
        r.process_event(&3).unwrap();
        r.process_event(&5).unwrap();
        assert_eq!(*r.seen.lock().unwrap(), vec![3, 5]);
    }

    #[test]
    fn fallible_closure_is_a_listener() {
        let l = |p: &i32| {
            if *p < 0 {
                anyhow::bail!("negative payload: {p}");
            }
            Ok(())
        };
        assert!(l.process_event(&1).is_ok());
        let err = l.process_event(&-1).unwrap_err();
        assert_eq!(err.to_string(), "negative payload: -1");
    }

    #[test]
    fn listener_fn_wraps_infallible_closure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let l = listener_fn({
            let hits = hits.clone();
            move |_: &()| {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        });
        l.process_event(&()).unwrap();
        l.process_event(&()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
