//! 설정 모듈
//!
//! 로드 순서: 기본값 → JSON 파일 (선택) → 환경변수 오버라이드.
//! API 키는 설정 파일에 두지 않고 환경변수에서만 읽습니다.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::assistant::DEFAULT_HISTORY_WINDOW;
use crate::generation::DEFAULT_MODEL;
use crate::knowledge::DEFAULT_TOP_K;

/// 설정 디렉토리 이름
const APP_DIR: &str = "griot-rag";
/// 설정 파일 이름
const CONFIG_FILE: &str = "config.json";

/// 기본 검색 결과 수
pub const DEFAULT_SEARCH_LIMIT: usize = 3;

/// 어시스턴트 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// 응답에 쓰는 상위 청크 수
    pub top_k: usize,
    /// 대화 윈도우 크기
    pub history_window: usize,
    /// 외부 검색 결과 수
    pub search_limit: usize,
    /// 외부 협력자(검색/생성) 사용 여부
    pub online: bool,
    /// 생성 모델명
    pub generation_model: String,
    /// 응답 rng 시드 (None 이면 엔트로피)
    pub seed: Option<u64>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            history_window: DEFAULT_HISTORY_WINDOW,
            search_limit: DEFAULT_SEARCH_LIMIT,
            online: false,
            generation_model: DEFAULT_MODEL.to_string(),
            seed: None,
        }
    }
}

impl AssistantConfig {
    /// 오프라인 전용 (지식 베이스만)
    pub fn offline() -> Self {
        Self::default()
    }

    /// 온라인 폴백 활성화
    pub fn online() -> Self {
        Self {
            online: true,
            ..Self::default()
        }
    }

    /// 재현 가능한 응답 (고정 시드)
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// 기본 경로 + 환경변수로 로드
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// 설정 로드
    ///
    /// `path` 가 주어지면 그 파일이 반드시 있어야 하고,
    /// 없으면 기본 경로의 파일을 (있을 때만) 읽습니다.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match config_path() {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// JSON 파일에서 읽기
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// JSON 파일로 저장
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// 환경변수 오버라이드
    ///
    /// GRIOT_TOP_K, GRIOT_SEARCH_LIMIT, GRIOT_ONLINE, GRIOT_SEED, GRIOT_MODEL
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("GRIOT_TOP_K") {
            self.top_k = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid GRIOT_TOP_K: {:?}", value))?;
        }
        if let Some(value) = lookup("GRIOT_SEARCH_LIMIT") {
            self.search_limit = value
                .trim()
                .parse()
                .with_context(|| format!("Invalid GRIOT_SEARCH_LIMIT: {:?}", value))?;
        }
        if let Some(value) = lookup("GRIOT_ONLINE") {
            self.online = parse_bool(&value)
                .with_context(|| format!("Invalid GRIOT_ONLINE: {:?}", value))?;
        }
        if let Some(value) = lookup("GRIOT_SEED") {
            self.seed = Some(
                value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid GRIOT_SEED: {:?}", value))?,
            );
        }
        if let Some(value) = lookup("GRIOT_MODEL") {
            if !value.trim().is_empty() {
                self.generation_model = value.trim().to_string();
            }
        }
        Ok(())
    }

    /// 값 범위 검증
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            anyhow::bail!("top_k must be at least 1");
        }
        if self.history_window == 0 {
            anyhow::bail!("history_window must be at least 1");
        }
        if self.generation_model.trim().is_empty() {
            anyhow::bail!("generation_model must not be empty");
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {:?}", other),
    }
}

/// 기본 설정 파일 경로
///
/// Windows: %APPDATA%\griot-rag\config.json
/// Linux: ~/.config/griot-rag/config.json
/// macOS: ~/Library/Application Support/griot-rag/config.json
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.top_k, 3);
        assert_eq!(config.history_window, 10);
        assert_eq!(config.search_limit, 3);
        assert!(!config.online);
        assert_eq!(config.generation_model, "gemini-2.0-flash");
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert!(AssistantConfig::online().online);
        assert!(!AssistantConfig::offline().online);
        assert_eq!(AssistantConfig::deterministic(7).seed, Some(7));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"top_k": 5, "online": true}"#).unwrap();

        let config = AssistantConfig::from_file(&path).unwrap();
        assert_eq!(config.top_k, 5);
        assert!(config.online);
        assert_eq!(config.search_limit, DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AssistantConfig::deterministic(42);
        config.save(&path).unwrap();

        let loaded = AssistantConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempdir().unwrap();
        let result = AssistantConfig::load_from(Some(&dir.path().join("missing.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ top_k: ").unwrap();
        assert!(AssistantConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AssistantConfig::default();
        config
            .apply_env(env(&[
                ("GRIOT_TOP_K", "5"),
                ("GRIOT_SEARCH_LIMIT", " 2 "),
                ("GRIOT_ONLINE", "yes"),
                ("GRIOT_SEED", "1234"),
                ("GRIOT_MODEL", "gemini-1.5-pro"),
            ]))
            .unwrap();

        assert_eq!(config.top_k, 5);
        assert_eq!(config.search_limit, 2);
        assert!(config.online);
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.generation_model, "gemini-1.5-pro");
    }

    #[test]
    fn test_invalid_env_fails() {
        let mut config = AssistantConfig::default();
        assert!(config.apply_env(env(&[("GRIOT_TOP_K", "many")])).is_err());
        assert!(config.apply_env(env(&[("GRIOT_ONLINE", "maybe")])).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let config = AssistantConfig {
            top_k: 0,
            ..AssistantConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_path() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("griot-rag/config.json"));
        }
    }
}
