//! 运行上下文
//!
//! 封装"这一次处理是哪个会话、哪一代、哪个指标"这一信息

use std::fmt::Display;

use crate::state::Generation;

/// 运行上下文
///
/// 流程开始时从共享状态取一份快照；结果回来后用代号判断是否过期
#[derive(Debug, Clone)]
pub struct RunCtx {
    /// 会话 ID
    pub session_id: String,

    /// 开始运行时的会话代号
    pub generation: Generation,

    /// 指标显示名（仅用于日志显示）
    pub metric_name: String,
}

impl RunCtx {
    /// 创建新的运行上下文
    pub fn new(
        session_id: impl Into<String>,
        generation: Generation,
        metric_name: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            generation,
            metric_name: metric_name.into(),
        }
    }
}

impl Display for RunCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[会话 {} 指标#{} 代#{}]",
            self.session_id, self.metric_name, self.generation
        )
    }
}
