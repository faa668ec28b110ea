//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 reqwest 客户端资源，只暴露"发请求"的能力

use reqwest::multipart::Form;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, AppResult};
use crate::models::ApiErrorBody;

/// HTTP 执行器
///
/// 职责：
/// - 持有唯一的 reqwest::Client 资源
/// - 暴露 post_json / post_form / get_json / get_bytes 能力
/// - 统一把非 2xx 响应翻译成带原文的 ApiError
/// - 不认识 Metric / RuleSet
/// - 不处理业务流程
pub struct HttpExecutor {
    client: reqwest::Client,
    base_url: String,
}

impl HttpExecutor {
    /// 创建新的 HTTP 执行器
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed {
                endpoint: "client".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// POST JSON 请求体，反序列化 JSON 响应
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> AppResult<T> {
        debug!("POST {} 请求体: {}", path, body);
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| request_failed(path, e))?;
        Self::parse_json(path, response).await
    }

    /// POST multipart 表单，反序列化 JSON 响应
    pub async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> AppResult<T> {
        debug!("POST {} (multipart)", path);
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_failed(path, e))?;
        Self::parse_json(path, response).await
    }

    /// GET 请求，反序列化 JSON 响应
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| request_failed(path, e))?;
        Self::parse_json(path, response).await
    }

    /// GET 请求，返回原始字节（下载用）
    pub async fn get_bytes(&self, path: &str) -> AppResult<Vec<u8>> {
        debug!("GET {} (bytes)", path);
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| request_failed(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| request_failed(path, e))?;
            return Err(server_rejected(path, status.as_u16(), &text).into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| request_failed(path, e))?;
        Ok(bytes.to_vec())
    }

    /// 把响应体翻译成目标类型
    ///
    /// 非 2xx：取 JSON 体里的 error / message 字段原文
    async fn parse_json<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| request_failed(path, e))?;

        if !status.is_success() {
            return Err(server_rejected(path, status.as_u16(), &text).into());
        }

        serde_json::from_str(&text)
            .map_err(|e| {
                ApiError::JsonParseFailed {
                    endpoint: path.to_string(),
                    source: Box::new(e),
                }
                .into()
            })
    }
}

fn request_failed(path: &str, source: reqwest::Error) -> ApiError {
    ApiError::RequestFailed {
        endpoint: path.to_string(),
        source: Box::new(source),
    }
}

/// 组装服务器拒绝错误，尽量保留服务器给的错误原文
fn server_rejected(path: &str, status: u16, body_text: &str) -> ApiError {
    let message = serde_json::from_str::<ApiErrorBody>(body_text)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| {
            if body_text.is_empty() {
                format!("HTTP {}", status)
            } else {
                crate::utils::logging::truncate_text(body_text, 200)
            }
        });

    ApiError::ServerRejected {
        endpoint: path.to_string(),
        status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_rejected_extracts_error_field() {
        let err = server_rejected("clean_wc/abc", 400, r#"{"error": "Invalid session ID"}"#);
        assert_eq!(err.server_message(), Some("Invalid session ID"));
    }

    #[test]
    fn test_server_rejected_falls_back_to_message_field() {
        let err = server_rejected(
            "clean_sales/abc",
            500,
            r#"{"message": "Sales processing failed or no files were processed."}"#,
        );
        assert_eq!(
            err.server_message(),
            Some("Sales processing failed or no files were processed.")
        );
    }

    #[test]
    fn test_server_rejected_handles_non_json_body() {
        let err = server_rejected("upload", 502, "Bad Gateway");
        assert_eq!(err.server_message(), Some("Bad Gateway"));

        let err = server_rejected("upload", 502, "");
        assert_eq!(err.server_message(), Some("HTTP 502"));
    }
}
