//! Reporter 配置

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// 默认队列阈值
pub const DEFAULT_THRESHOLD: usize = 10_000;

/// 默认 Checkin 周期（秒）
pub const DEFAULT_CHECK_FREQUENCY_SECS: u64 = 30;

/// Fleet Reporter 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// 队列阈值
    /// - 0: 不限制，永不丢弃
    /// - N: 每次追加后队列超过 N 时丢弃一条
    pub threshold: usize,

    /// Checkin 周期
    #[serde(rename = "reporting_check_frequency_secs", with = "duration_secs")]
    pub reporting_check_frequency: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            reporting_check_frequency: Duration::from_secs(DEFAULT_CHECK_FREQUENCY_SECS),
        }
    }
}

impl ReporterConfig {
    /// 指定阈值，其余取默认值
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// 从环境变量创建配置
    ///
    /// - `FLEET_REPORTER_THRESHOLD`
    /// - `FLEET_REPORTER_CHECK_FREQUENCY_SECS`
    ///
    /// 无法解析的值回退到默认值
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("FLEET_REPORTER_THRESHOLD") {
            match raw.trim().parse::<usize>() {
                Ok(threshold) => config.threshold = threshold,
                Err(e) => tracing::warn!(
                    "FLEET_REPORTER_THRESHOLD 无效，使用默认值 {}: value={}, err={}",
                    DEFAULT_THRESHOLD,
                    raw,
                    e
                ),
            }
        }

        if let Ok(raw) = std::env::var("FLEET_REPORTER_CHECK_FREQUENCY_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    config.reporting_check_frequency = Duration::from_secs(secs)
                }
                _ => tracing::warn!(
                    "FLEET_REPORTER_CHECK_FREQUENCY_SECS 无效，使用默认值 {}s: value={}",
                    DEFAULT_CHECK_FREQUENCY_SECS,
                    raw
                ),
            }
        }

        config
    }

    /// 从 JSON 文件加载配置（缺失字段取默认值）
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.reporting_check_frequency.is_zero() {
            return Err(Error::Config(
                "reporting_check_frequency_secs 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 是否不限制队列长度
    pub fn is_unlimited(&self) -> bool {
        self.threshold == 0
    }
}

/// LogBackend 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 单行文本
    #[default]
    Default,
    /// 单行 JSON
    Json,
}

/// LogBackend 配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
