//! 文件名清理
//!
//! 服务器返回的文件名在落盘前先做一次清理，
//! 防止路径分隔符或控制字符拼进本地路径

use std::sync::OnceLock;

use regex::Regex;

fn invalid_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[\x00-\x1f<>:"|?*]+"#).expect("固定的正则必然合法"))
}

/// 把服务器给的文件名清理成安全的本地文件名
///
/// - 丢弃所有目录成分，只保留最后一段
/// - 替换控制字符和 Windows 不允许的字符为 `_`
/// - 清理后为空则回落到 `unnamed`
pub fn sanitize_filename(name: &str) -> String {
    let last_segment = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned = invalid_chars().replace_all(last_segment, "_");
    let cleaned = cleaned.trim().trim_matches('.');

    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_untouched() {
        assert_eq!(sanitize_filename("Sales_Data_Processed.xlsx"), "Sales_Data_Processed.xlsx");
    }

    #[test]
    fn test_path_components_stripped() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\out\report.docx"), "report.docx");
        assert_eq!(sanitize_filename("a/b/c.csv"), "c.csv");
    }

    #[test]
    fn test_invalid_chars_replaced() {
        assert_eq!(sanitize_filename("bad:name?.xlsx"), "bad_name_.xlsx");
    }

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "unnamed");
        assert_eq!(sanitize_filename("..."), "unnamed");
    }
}
