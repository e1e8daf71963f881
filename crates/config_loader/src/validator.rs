//! 配置校验模块
//!
//! 校验规则：
//! - endpoint 非空，且为绝对 http(s) URL 或以 '/' 开头的相对路径
//! - 参数名非空
//!
//! 返回第一个遇到的错误，或 Ok(())。

use contracts::{UploadError, UploaderBlueprint};

/// 校验 UploaderBlueprint 配置
pub fn validate(blueprint: &UploaderBlueprint) -> Result<(), UploadError> {
    validate_endpoint(&blueprint.request.endpoint, "request.endpoint")?;
    validate_param_names(blueprint)?;
    Ok(())
}

/// 校验 endpoint 形状
///
/// `field` 用于错误定位，endpoint 也可能来自运行时覆盖。
pub fn validate_endpoint(endpoint: &str, field: &str) -> Result<(), UploadError> {
    if endpoint.is_empty() {
        return Err(UploadError::config_validation(
            field,
            "endpoint cannot be empty",
        ));
    }

    let well_formed = endpoint.starts_with('/')
        || endpoint.starts_with("http://")
        || endpoint.starts_with("https://");

    if !well_formed {
        return Err(UploadError::config_validation(
            field,
            format!("endpoint must be an absolute http(s) URL or start with '/', got '{endpoint}'"),
        ));
    }

    Ok(())
}

/// 校验参数名非空
fn validate_param_names(blueprint: &UploaderBlueprint) -> Result<(), UploadError> {
    for name in blueprint.request.params.keys() {
        if name.is_empty() {
            return Err(UploadError::config_validation(
                "request.params",
                "parameter names cannot be empty",
            ));
        }
    }
    Ok(())
}
