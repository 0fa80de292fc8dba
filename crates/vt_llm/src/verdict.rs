//! 裁决提取策略
//!
//! Reviewer 的分析文本目前不参与正确性判定：默认策略 [`AlwaysCorrect`]
//! 恒定返回 `true`。需要真正的文本解析时替换为其它实现。

/// 从 Reviewer 分析文本推导正确性裁决
pub trait VerdictStrategy: Send + Sync + 'static {
    /// 策略名称 (用于日志)
    fn name(&self) -> &'static str;

    /// 给出裁决
    fn judge(&self, analysis: &str) -> bool;
}

/// 占位策略：无论分析内容如何都判定为正确
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysCorrect;

impl VerdictStrategy for AlwaysCorrect {
    fn name(&self) -> &'static str {
        "always_correct"
    }

    fn judge(&self, _analysis: &str) -> bool {
        true
    }
}
