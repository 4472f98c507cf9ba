use bon::Builder;

/// 监听器失败时的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// 继续调用剩余监听器，全部执行完后汇总报告失败
    #[default]
    ContinueOnError,
    /// 遇到第一个失败立即中止本次触发，剩余监听器不再调用
    FailFast,
}

/// 事件处理器配置
#[derive(Builder, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessorConfig {
    /// 监听器失败策略
    #[builder(default)]
    pub failure_policy: FailurePolicy,
    /// 监听器表的预分配容量
    #[builder(default)]
    pub initial_capacity: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_continue_on_error() {
        let config = ProcessorConfig::default();
        assert_eq!(config.failure_policy, FailurePolicy::ContinueOnError);
        assert_eq!(config.initial_capacity, 0);
        assert_eq!(ProcessorConfig::builder().build(), config);
    }

    #[test]
    fn builder_sets_fields() {
        let config = ProcessorConfig::builder()
            .failure_policy(FailurePolicy::FailFast)
            .initial_capacity(1024)
            .build();
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.initial_capacity, 1024);
    }
}
