//! 指标定义
//!
//! 顶层业务指标决定走哪个后端端点、请求体带哪些附加字段

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, StateError};

/// 顶层业务指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// 销售数据清洗
    Sales,
    /// 人员费用清洗
    Pex,
    /// 订单录入清洗
    Oe,
    /// 营运资金清洗
    WorkingCapital,
    /// AI 推理（markdown 文稿润色）
    Inference,
    /// markdown → DOCX 转换流水线
    ProcessingPipeline,
}

impl Metric {
    /// 从配置里的指标名解析
    pub fn from_key(key: &str) -> Result<Self, ConfigError> {
        match key {
            "sales" => Ok(Metric::Sales),
            "pex" => Ok(Metric::Pex),
            "oe" => Ok(Metric::Oe),
            "working-capital" => Ok(Metric::WorkingCapital),
            "inference" => Ok(Metric::Inference),
            "processing-pipeline" => Ok(Metric::ProcessingPipeline),
            other => Err(ConfigError::UnknownMetric {
                value: other.to_string(),
            }),
        }
    }

    /// 指标名（与配置/日志一致）
    pub fn key(self) -> &'static str {
        match self {
            Metric::Sales => "sales",
            Metric::Pex => "pex",
            Metric::Oe => "oe",
            Metric::WorkingCapital => "working-capital",
            Metric::Inference => "inference",
            Metric::ProcessingPipeline => "processing-pipeline",
        }
    }

    /// 显示名称
    pub fn name(self) -> &'static str {
        match self {
            Metric::Sales => "Sales",
            Metric::Pex => "PEX",
            Metric::Oe => "OE",
            Metric::WorkingCapital => "Working Capital",
            Metric::Inference => "AI Inference",
            Metric::ProcessingPipeline => "Processing Pipeline",
        }
    }

    /// 该指标的子选项列表（顺序即界面展示顺序）
    pub fn sub_options(self) -> &'static [&'static str] {
        match self {
            Metric::Pex => &["pex-bi", "pex-vendor"],
            Metric::WorkingCapital => &["dso", "overhead"],
            _ => &[],
        }
    }

    /// 该指标的第一个子选项（没有子选项则为 None）
    pub fn first_sub_option(self) -> Option<&'static str> {
        self.sub_options().first().copied()
    }

    /// 清洗端点（文档类指标没有清洗端点）
    pub fn cleaning_endpoint(self) -> Option<&'static str> {
        match self {
            Metric::Sales => Some("clean_sales"),
            Metric::Oe => Some("clean_oe"),
            Metric::Pex => Some("clean_pex"),
            Metric::WorkingCapital => Some("clean_wc"),
            Metric::Inference | Metric::ProcessingPipeline => None,
        }
    }

    /// 是否属于文档处理类指标（走 pipeline / inference 流程）
    pub fn is_document_mode(self) -> bool {
        matches!(self, Metric::Inference | Metric::ProcessingPipeline)
    }
}

/// 营运资金的处理种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkingCapitalKind {
    Dso,
    Overhead,
}

impl WorkingCapitalKind {
    pub fn key(self) -> &'static str {
        match self {
            WorkingCapitalKind::Dso => "dso",
            WorkingCapitalKind::Overhead => "overhead",
        }
    }
}

/// 供应商分析类型（仅 pex-vendor 使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorAnalysisType {
    /// 环比（month over month）
    Mom,
    /// 季度累计（quarter to date）
    Qtd,
}

impl Default for VendorAnalysisType {
    fn default() -> Self {
        VendorAnalysisType::Mom
    }
}

impl VendorAnalysisType {
    pub fn key(self) -> &'static str {
        match self {
            VendorAnalysisType::Mom => "mom",
            VendorAnalysisType::Qtd => "qtd",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "mom" => Some(VendorAnalysisType::Mom),
            "qtd" => Some(VendorAnalysisType::Qtd),
            _ => None,
        }
    }
}

/// 当前的指标选择
///
/// 子指标只有一个存储位置：营运资金的 dso/overhead 种类
/// 通过 [`MetricSelection::working_capital_kind`] 从子指标推导，不单独保存
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSelection {
    pub metric: Metric,
    pub sub_metric: Option<String>,
}

impl MetricSelection {
    /// 选择一个顶层指标
    ///
    /// 子指标自动落到该指标的第一个子选项（没有则清空）
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            sub_metric: metric.first_sub_option().map(str::to_string),
        }
    }

    /// 切换子指标
    ///
    /// 子指标必须属于当前指标的子选项列表
    pub fn select_sub_metric(&mut self, sub_metric: &str) -> Result<(), StateError> {
        if !self.metric.sub_options().contains(&sub_metric) {
            return Err(StateError::UnknownSubMetric {
                metric: self.metric.key().to_string(),
                sub_metric: sub_metric.to_string(),
            });
        }
        self.sub_metric = Some(sub_metric.to_string());
        Ok(())
    }

    /// 推导营运资金种类
    ///
    /// 子指标是 dso/overhead 时与其一致，否则回落到 dso
    pub fn working_capital_kind(&self) -> WorkingCapitalKind {
        match self.sub_metric.as_deref() {
            Some("overhead") => WorkingCapitalKind::Overhead,
            _ => WorkingCapitalKind::Dso,
        }
    }
}

impl Default for MetricSelection {
    fn default() -> Self {
        Self::new(Metric::Sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_metric_with_sub_options_picks_first() {
        assert_eq!(
            MetricSelection::new(Metric::Pex).sub_metric.as_deref(),
            Some("pex-bi")
        );
        assert_eq!(
            MetricSelection::new(Metric::WorkingCapital)
                .sub_metric
                .as_deref(),
            Some("dso")
        );
    }

    #[test]
    fn test_select_metric_without_sub_options_clears_sub_metric() {
        assert_eq!(MetricSelection::new(Metric::Sales).sub_metric, None);
        assert_eq!(MetricSelection::new(Metric::Oe).sub_metric, None);
        assert_eq!(MetricSelection::new(Metric::Inference).sub_metric, None);
    }

    #[test]
    fn test_working_capital_kind_follows_sub_metric() {
        let mut selection = MetricSelection::new(Metric::WorkingCapital);
        assert_eq!(selection.working_capital_kind(), WorkingCapitalKind::Dso);

        selection.select_sub_metric("overhead").unwrap();
        assert_eq!(
            selection.working_capital_kind(),
            WorkingCapitalKind::Overhead
        );

        selection.select_sub_metric("dso").unwrap();
        assert_eq!(selection.working_capital_kind(), WorkingCapitalKind::Dso);
    }

    #[test]
    fn test_working_capital_kind_defaults_to_dso_for_other_metrics() {
        // 子指标不是 dso/overhead 时一律回落到 dso
        assert_eq!(
            MetricSelection::new(Metric::Pex).working_capital_kind(),
            WorkingCapitalKind::Dso
        );
        assert_eq!(
            MetricSelection::new(Metric::Sales).working_capital_kind(),
            WorkingCapitalKind::Dso
        );
    }

    #[test]
    fn test_select_sub_metric_rejects_foreign_value() {
        let mut selection = MetricSelection::new(Metric::Pex);
        assert!(selection.select_sub_metric("dso").is_err());
        // 失败的切换不应该动原值
        assert_eq!(selection.sub_metric.as_deref(), Some("pex-bi"));
    }

    #[test]
    fn test_cleaning_endpoint_table() {
        assert_eq!(Metric::Sales.cleaning_endpoint(), Some("clean_sales"));
        assert_eq!(Metric::Oe.cleaning_endpoint(), Some("clean_oe"));
        assert_eq!(Metric::Pex.cleaning_endpoint(), Some("clean_pex"));
        assert_eq!(
            Metric::WorkingCapital.cleaning_endpoint(),
            Some("clean_wc")
        );
        assert_eq!(Metric::Inference.cleaning_endpoint(), None);
        assert_eq!(Metric::ProcessingPipeline.cleaning_endpoint(), None);
    }

    #[test]
    fn test_metric_key_roundtrip() {
        for metric in [
            Metric::Sales,
            Metric::Pex,
            Metric::Oe,
            Metric::WorkingCapital,
            Metric::Inference,
            Metric::ProcessingPipeline,
        ] {
            assert_eq!(Metric::from_key(metric.key()).unwrap(), metric);
        }
        assert!(Metric::from_key("revenue").is_err());
    }
}
