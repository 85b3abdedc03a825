//! 에이전트 설정
//!
//! 임계값과 지식 파일 위치를 결정합니다.
//!
//! 지식 파일 우선순위:
//! 1. `--knowledge` 플래그
//! 2. `THOUGHTFUL_AGENT_KNOWLEDGE` 환경변수
//! 3. `~/.thoughtful-agent/knowledge.json` (있을 때만)
//! 4. 내장 지식베이스

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::knowledge::{get_data_dir, DEFAULT_FUZZY_CUTOFF};

/// 지식 파일 경로 환경변수
pub const KNOWLEDGE_ENV: &str = "THOUGHTFUL_AGENT_KNOWLEDGE";

/// 데이터 디렉토리 안의 기본 지식 파일 이름
pub const KNOWLEDGE_FILE_NAME: &str = "knowledge.json";

/// 답변 채택 임계값 (이 값을 초과해야 채택)
pub const DEFAULT_ACCEPT_THRESHOLD: f64 = 0.5;

/// 이 값 미만이면 낮은 신뢰도 안내 추가
pub const DEFAULT_CAUTION_THRESHOLD: f64 = 0.7;

// ============================================================================
// Errors
// ============================================================================

/// 설정 오류
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("caution threshold ({caution}) must not be below accept threshold ({accept})")]
    CautionBelowAccept { accept: f64, caution: f64 },
}

// ============================================================================
// AgentConfig
// ============================================================================

/// 에이전트 임계값 설정
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentConfig {
    /// 지식베이스 답변 채택 기준 (초과)
    pub accept_threshold: f64,
    /// 낮은 신뢰도 안내 기준 (미만)
    pub caution_threshold: f64,
    /// 퍼지 매칭 컷오프 (이상)
    pub fuzzy_cutoff: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            accept_threshold: DEFAULT_ACCEPT_THRESHOLD,
            caution_threshold: DEFAULT_CAUTION_THRESHOLD,
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
        }
    }
}

impl AgentConfig {
    /// 값 검증
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("accept_threshold", self.accept_threshold),
            ("caution_threshold", self.caution_threshold),
            ("fuzzy_cutoff", self.fuzzy_cutoff),
        ];

        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }

        if self.caution_threshold < self.accept_threshold {
            return Err(ConfigError::CautionBelowAccept {
                accept: self.accept_threshold,
                caution: self.caution_threshold,
            });
        }

        Ok(())
    }
}

// ============================================================================
// KnowledgeSource
// ============================================================================

/// 지식베이스 출처
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeSource {
    /// 내장 데이터
    Builtin,
    /// JSON 지식 파일
    File(PathBuf),
}

impl KnowledgeSource {
    /// 우선순위에 따라 출처 결정
    pub fn resolve(flag: Option<PathBuf>) -> Self {
        let env = std::env::var(KNOWLEDGE_ENV).ok().map(PathBuf::from);
        Self::resolve_with(flag, env, &get_data_dir())
    }

    /// 플래그/환경변수/데이터 디렉토리를 직접 받아 결정
    pub fn resolve_with(flag: Option<PathBuf>, env: Option<PathBuf>, data_dir: &Path) -> Self {
        // 1. 플래그
        if let Some(path) = flag {
            return Self::File(path);
        }

        // 2. 환경변수
        if let Some(path) = env.filter(|p| !p.as_os_str().is_empty()) {
            tracing::debug!("Using knowledge file from {}", KNOWLEDGE_ENV);
            return Self::File(path);
        }

        // 3. 데이터 디렉토리
        let default_file = data_dir.join(KNOWLEDGE_FILE_NAME);
        if default_file.is_file() {
            return Self::File(default_file);
        }

        Self::Builtin
    }
}

impl fmt::Display for KnowledgeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "built-in"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
