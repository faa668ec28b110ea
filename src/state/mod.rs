//! 会话状态存储
//!
//! 整个进程唯一的一份共享界面状态：会话 ID、指标选择、规则开关、
//! 批量模式、供应商分析类型
//!
//! ## 设计约定
//!
//! - 所有修改都走命名意图（`store_session` / `select_metric` /
//!   `toggle_rule` / `clear_session` …），不暴露裸字段写入
//! - 后写覆盖先写，没有仲裁；这是契约的一部分，不是事故
//! - 每次会话替换（新上传或清除）都会推进一次"代"计数，
//!   在途请求带着旧代号回来时可以据此识别并丢弃（防止过期响应回写）
//! - 清除选择会把供应商分析类型一并重置为默认值（统一后的策略）

use tracing::debug;

use crate::models::{Metric, MetricSelection, RuleName, RuleSet, VendorAnalysisType};

/// 会话代号
///
/// 流程开始时取一份，结果回来时校验是否还是当前代
pub type Generation = u64;

/// 应用共享状态
#[derive(Debug, Clone)]
pub struct AppState {
    session: Option<String>,
    generation: Generation,
    bulk_mode: bool,
    selection: MetricSelection,
    rules: RuleSet,
    vendor_analysis_type: VendorAnalysisType,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: None,
            generation: 0,
            bulk_mode: false,
            selection: MetricSelection::default(),
            rules: RuleSet::default(),
            vendor_analysis_type: VendorAnalysisType::default(),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== 读取 ==========

    /// 当前会话 ID
    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }

    /// 当前会话代号
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// 校验一个代号是否还是当前代
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    pub fn bulk_mode(&self) -> bool {
        self.bulk_mode
    }

    pub fn selection(&self) -> &MetricSelection {
        &self.selection
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn vendor_analysis_type(&self) -> VendorAnalysisType {
        self.vendor_analysis_type
    }

    // ========== 命名意图 ==========

    /// 记录一次成功上传返回的会话 ID
    ///
    /// 替换旧会话并推进代号，让旧会话的在途结果全部失效
    pub fn store_session(&mut self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        debug!("记录新会话: {}", session_id);
        self.session = Some(session_id);
        self.generation += 1;
    }

    /// 清除当前选择
    ///
    /// 会话 ID 清空、代号推进、供应商分析类型重置为默认值
    pub fn clear_session(&mut self) {
        debug!("清除会话与选择");
        self.session = None;
        self.generation += 1;
        self.vendor_analysis_type = VendorAnalysisType::default();
    }

    /// 选择顶层指标
    ///
    /// 子指标自动落到该指标的第一个子选项（没有则清空）
    pub fn select_metric(&mut self, metric: Metric) {
        self.selection = MetricSelection::new(metric);
    }

    /// 选择子指标
    pub fn select_sub_metric(&mut self, sub_metric: &str) -> Result<(), crate::error::StateError> {
        self.selection.select_sub_metric(sub_metric)
    }

    /// 翻转一个规则开关
    pub fn toggle_rule(&mut self, rule: RuleName) {
        self.rules.toggle(rule);
        debug!("规则 {} → {}", rule.key(), self.rules.get(rule));
    }

    /// 整套替换规则开关（从配置载入时用）
    pub fn set_rules(&mut self, rules: RuleSet) {
        self.rules = rules;
    }

    pub fn set_bulk_mode(&mut self, bulk_mode: bool) {
        self.bulk_mode = bulk_mode;
    }

    pub fn set_vendor_analysis_type(&mut self, analysis_type: VendorAnalysisType) {
        self.vendor_analysis_type = analysis_type;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkingCapitalKind;

    #[test]
    fn test_store_session_replaces_and_bumps_generation() {
        let mut state = AppState::new();
        assert_eq!(state.session(), None);

        state.store_session("abc");
        let first_generation = state.generation();
        assert_eq!(state.session(), Some("abc"));

        state.store_session("def");
        assert_eq!(state.session(), Some("def"));
        assert!(state.generation() > first_generation);
        assert!(!state.is_current(first_generation));
    }

    #[test]
    fn test_clear_session_resets_vendor_analysis_type() {
        let mut state = AppState::new();
        state.store_session("abc");
        state.set_vendor_analysis_type(VendorAnalysisType::Qtd);

        state.clear_session();
        assert_eq!(state.session(), None);
        assert_eq!(state.vendor_analysis_type(), VendorAnalysisType::Mom);
    }

    #[test]
    fn test_stale_generation_detected_after_clear() {
        let mut state = AppState::new();
        state.store_session("abc");
        let generation = state.generation();
        assert!(state.is_current(generation));

        state.clear_session();
        assert!(!state.is_current(generation));
    }

    #[test]
    fn test_select_metric_resets_sub_metric() {
        let mut state = AppState::new();
        state.select_metric(Metric::Pex);
        assert_eq!(state.selection().sub_metric.as_deref(), Some("pex-bi"));

        state.select_metric(Metric::Sales);
        assert_eq!(state.selection().sub_metric, None);
    }

    #[test]
    fn test_working_capital_kind_via_intents() {
        let mut state = AppState::new();
        state.select_metric(Metric::WorkingCapital);
        assert_eq!(
            state.selection().working_capital_kind(),
            WorkingCapitalKind::Dso
        );

        state.select_sub_metric("overhead").unwrap();
        assert_eq!(
            state.selection().working_capital_kind(),
            WorkingCapitalKind::Overhead
        );
    }

    #[test]
    fn test_toggle_rule_parity() {
        let mut state = AppState::new();
        state.toggle_rule(RuleName::NormalizeData);
        assert!(state.rules().normalize_data);
        state.toggle_rule(RuleName::NormalizeData);
        assert_eq!(*state.rules(), RuleSet::default());
    }
}
