//! 清洗规则开关
//!
//! 六个固定的布尔开关，按服务器要求以 camelCase 原样放进请求体
//! 任何组合都是合法的，客户端不做组合校验

use serde::{Deserialize, Serialize};

/// 规则名
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleName {
    RemoveDuplicates,
    GroupUnits,
    ValidateFormats,
    StandardizeNames,
    RemoveOutliers,
    NormalizeData,
}

impl RuleName {
    /// 全部规则（顺序即界面展示顺序）
    pub const ALL: [RuleName; 6] = [
        RuleName::RemoveDuplicates,
        RuleName::GroupUnits,
        RuleName::ValidateFormats,
        RuleName::StandardizeNames,
        RuleName::RemoveOutliers,
        RuleName::NormalizeData,
    ];

    /// 规则的请求体字段名
    pub fn key(self) -> &'static str {
        match self {
            RuleName::RemoveDuplicates => "removeDuplicates",
            RuleName::GroupUnits => "groupUnits",
            RuleName::ValidateFormats => "validateFormats",
            RuleName::StandardizeNames => "standardizeNames",
            RuleName::RemoveOutliers => "removeOutliers",
            RuleName::NormalizeData => "normalizeData",
        }
    }
}

/// 清洗规则开关集合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleSet {
    pub remove_duplicates: bool,
    pub group_units: bool,
    pub validate_formats: bool,
    pub standardize_names: bool,
    pub remove_outliers: bool,
    pub normalize_data: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            remove_duplicates: true,
            group_units: true,
            validate_formats: true,
            standardize_names: false,
            remove_outliers: false,
            normalize_data: false,
        }
    }
}

impl RuleSet {
    /// 翻转一个规则开关
    pub fn toggle(&mut self, rule: RuleName) {
        let flag = self.flag_mut(rule);
        *flag = !*flag;
    }

    /// 读取一个规则开关
    pub fn get(&self, rule: RuleName) -> bool {
        match rule {
            RuleName::RemoveDuplicates => self.remove_duplicates,
            RuleName::GroupUnits => self.group_units,
            RuleName::ValidateFormats => self.validate_formats,
            RuleName::StandardizeNames => self.standardize_names,
            RuleName::RemoveOutliers => self.remove_outliers,
            RuleName::NormalizeData => self.normalize_data,
        }
    }

    fn flag_mut(&mut self, rule: RuleName) -> &mut bool {
        match rule {
            RuleName::RemoveDuplicates => &mut self.remove_duplicates,
            RuleName::GroupUnits => &mut self.group_units,
            RuleName::ValidateFormats => &mut self.validate_formats,
            RuleName::StandardizeNames => &mut self.standardize_names,
            RuleName::RemoveOutliers => &mut self.remove_outliers,
            RuleName::NormalizeData => &mut self.normalize_data,
        }
    }
}
