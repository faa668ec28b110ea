//! 清洗服务 - 业务能力层
//!
//! 端点选择、请求体组装、清洗调用，以及两个配套能力：
//! 输出去重（/remove_duplicates）和数据预览（/preview）

use anyhow::Result;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use crate::error::StateError;
use crate::infrastructure::HttpExecutor;
use crate::models::{
    CleanResponse, DuplicateRemovalResponse, Metric, MetricSelection, PreviewResponse, RuleSet,
    VendorAnalysisType,
};

/// 数据预览的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// 上传的原始文件
    Raw,
    /// 清洗后的输出文件
    Cleaned,
}

impl PreviewKind {
    fn key(self) -> &'static str {
        match self {
            PreviewKind::Raw => "raw",
            PreviewKind::Cleaned => "cleaned",
        }
    }
}

/// 清洗服务
///
/// 职责：
/// - 按指标选择清洗端点（纯函数，可单测）
/// - 把规则开关 + 指标附加字段组装成请求体
/// - 只处理一次清洗调用，不关心进度展示
pub struct CleaningService;

impl CleaningService {
    /// 创建新的清洗服务
    pub fn new() -> Self {
        Self
    }

    /// 按指标选择清洗端点
    ///
    /// 文档类指标没有清洗端点，直接报状态错误
    pub fn endpoint_for(selection: &MetricSelection) -> Result<&'static str, StateError> {
        selection
            .metric
            .cleaning_endpoint()
            .ok_or_else(|| StateError::UnsupportedMetric {
                metric: selection.metric.key().to_string(),
            })
    }

    /// 组装清洗请求体
    ///
    /// 规则开关平铺 + `bulk_mode`，再按指标追加：
    /// - pex: `sub_metric` 与 `vendorAnalysisType`
    /// - working-capital: `metric` = 推导出的 dso/overhead
    pub fn build_payload(
        selection: &MetricSelection,
        rules: &RuleSet,
        bulk_mode: bool,
        vendor_analysis_type: VendorAnalysisType,
    ) -> Result<JsonValue, serde_json::Error> {
        let mut body = serde_json::to_value(rules)?;
        body["bulk_mode"] = json!(bulk_mode);

        match selection.metric {
            Metric::Pex => {
                body["sub_metric"] = json!(selection.sub_metric);
                body["vendorAnalysisType"] = json!(vendor_analysis_type.key());
            }
            Metric::WorkingCapital => {
                body["metric"] = json!(selection.working_capital_kind().key());
            }
            _ => {}
        }

        Ok(body)
    }

    /// 执行一次清洗调用
    ///
    /// # 参数
    /// - `executor`: HTTP 执行器
    /// - `session_id`: 上传时拿到的会话 ID
    /// - `selection` / `rules` / `bulk_mode` / `vendor_analysis_type`: 当前界面状态
    ///
    /// # 返回
    /// 返回服务器的终态响应（产出文件列表）
    pub async fn run(
        &self,
        executor: &HttpExecutor,
        session_id: &str,
        selection: &MetricSelection,
        rules: &RuleSet,
        bulk_mode: bool,
        vendor_analysis_type: VendorAnalysisType,
    ) -> Result<CleanResponse> {
        let endpoint = Self::endpoint_for(selection)?;
        let payload = Self::build_payload(selection, rules, bulk_mode, vendor_analysis_type)?;
        let path = format!("{}/{}", endpoint, session_id);

        info!("🧼 调用清洗端点: {}", path);
        let response: CleanResponse = executor.post_json(&path, &payload).await?;

        debug!("清洗响应: {} 个产出文件", response.cleaned_files.len());
        Ok(response)
    }

    /// 对输出目录做一次文件级去重
    ///
    /// 返回去重后保留的文件列表（服务器没有可处理文件时为 None）
    pub async fn remove_duplicates(
        &self,
        executor: &HttpExecutor,
        session_id: &str,
    ) -> Result<DuplicateRemovalResponse> {
        let path = format!("remove_duplicates/{}", session_id);
        info!("🧹 正在移除重复的输出文件...");
        let response: DuplicateRemovalResponse =
            executor.post_json(&path, &json!({})).await?;
        Ok(response)
    }

    /// 拉取数据预览（前几行 + 总行数）
    pub async fn preview(
        &self,
        executor: &HttpExecutor,
        session_id: &str,
        kind: PreviewKind,
        selection: &MetricSelection,
    ) -> Result<PreviewResponse> {
        let processing_type = match selection.metric {
            Metric::Sales => "sales",
            _ => "oe",
        };
        let path = format!(
            "preview/{}?type={}&processing_type={}",
            session_id,
            kind.key(),
            processing_type
        );
        let response: PreviewResponse = executor.get_json(&path).await?;
        Ok(response)
    }
}

impl Default for CleaningService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_table_covers_every_metric() {
        let cases = [
            (Metric::Sales, Some("clean_sales")),
            (Metric::Oe, Some("clean_oe")),
            (Metric::Pex, Some("clean_pex")),
            (Metric::WorkingCapital, Some("clean_wc")),
            (Metric::Inference, None),
            (Metric::ProcessingPipeline, None),
        ];
        for (metric, expected) in cases {
            let selection = MetricSelection::new(metric);
            match expected {
                Some(endpoint) => {
                    assert_eq!(CleaningService::endpoint_for(&selection).unwrap(), endpoint)
                }
                None => assert!(CleaningService::endpoint_for(&selection).is_err()),
            }
        }
    }

    #[test]
    fn test_sales_payload_is_flags_plus_bulk_mode() {
        let selection = MetricSelection::new(Metric::Sales);
        let payload = CleaningService::build_payload(
            &selection,
            &RuleSet::default(),
            false,
            VendorAnalysisType::default(),
        )
        .unwrap();

        assert_eq!(payload["bulk_mode"], json!(false));
        assert_eq!(payload["groupUnits"], json!(true));
        // 不该带其他指标的附加字段
        assert!(payload.get("sub_metric").is_none());
        assert!(payload.get("metric").is_none());
        assert!(payload.get("vendorAnalysisType").is_none());
    }

    #[test]
    fn test_pex_payload_carries_sub_metric_and_analysis_type() {
        let mut selection = MetricSelection::new(Metric::Pex);
        selection.select_sub_metric("pex-vendor").unwrap();

        let payload = CleaningService::build_payload(
            &selection,
            &RuleSet::default(),
            true,
            VendorAnalysisType::Qtd,
        )
        .unwrap();

        assert_eq!(payload["sub_metric"], json!("pex-vendor"));
        assert_eq!(payload["vendorAnalysisType"], json!("qtd"));
        assert_eq!(payload["bulk_mode"], json!(true));
    }

    #[test]
    fn test_working_capital_payload_uses_derived_kind() {
        let mut selection = MetricSelection::new(Metric::WorkingCapital);
        selection.select_sub_metric("overhead").unwrap();

        let payload = CleaningService::build_payload(
            &selection,
            &RuleSet::default(),
            false,
            VendorAnalysisType::default(),
        )
        .unwrap();

        assert_eq!(payload["metric"], json!("overhead"));
        assert!(payload.get("sub_metric").is_none());
    }
}
