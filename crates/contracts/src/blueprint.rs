//! UploaderBlueprint - Config Loader 输出
//!
//! 描述完整的上传器配置：默认 endpoint、全局请求参数、队列限制。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::RequestParams;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的上传器配置蓝图
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploaderBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 请求默认值 (endpoint + 全局参数)
    #[serde(default)]
    pub request: RequestConfig,

    /// 队列限制
    #[serde(default)]
    pub limits: LimitsConfig,
}

impl UploaderBlueprint {
    /// 将配置中的字面量参数转换为存储用的 `RequestParams`
    pub fn request_params(&self) -> RequestParams {
        RequestParams::from(self.request.params.clone())
    }
}

/// 请求配置：endpoint 与全局默认参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// 上传 endpoint (绝对 http(s) URL 或以 '/' 开头的相对路径)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// 全局默认请求参数 (仅字面量；lazy 参数只能在运行时注入)
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            params: HashMap::new(),
        }
    }
}

fn default_endpoint() -> String {
    "/upload".to_string()
}

/// 队列限制配置
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// 队列可接纳的最大条目数 (0 = 不限制)
    #[serde(default)]
    pub item_limit: usize,
}
