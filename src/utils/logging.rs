use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、运行日志文件和文本截断的辅助函数
use std::fs;
use tracing_subscriber::EnvFilter;

/// 初始化控制台日志
///
/// RUST_LOG 可覆盖默认的 info 级别
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化运行日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
///
/// # 返回
/// 返回是否成功初始化
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n数据清洗运行日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 把一次运行收集到的日志行追加到运行日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `lines`: 本次运行收集到的日志行
pub fn append_run_log(log_file_path: &str, lines: &[String]) -> Result<()> {
    use std::io::Write;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    for line in lines {
        writeln!(file, "{}", line)?;
    }
    writeln!(file, "{}", "─".repeat(60))?;
    Ok(())
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
