//! 채팅 세션 - 메모리 내 대화 기록
//!
//! 대화 기록은 매칭에 영향을 주지 않습니다 (표시 및 저장용).
//! 필요하면 JSON 트랜스크립트로 저장합니다.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Types
// ============================================================================

/// 메시지 작성자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 채팅 메시지
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// ChatSession
// ============================================================================

/// 채팅 세션
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// 새 세션 생성
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    /// 사용자 메시지 추가
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into());
    }

    /// 에이전트 메시지 추가
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into());
    }

    fn push(&mut self, role: Role, content: String) {
        self.messages.push(ChatMessage {
            role,
            content,
            created_at: Utc::now(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// 기록 초기화
    pub fn clear(&mut self) {
        tracing::debug!("Cleared {} messages from session {}", self.messages.len(), self.id);
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 트랜스크립트 저장 (`<dir>/<id>.json`)
    ///
    /// # Returns
    /// 저장된 파일 경로
    pub fn save_transcript(&self, dir: &Path) -> Result<PathBuf> {
        if !dir.exists() {
            std::fs::create_dir_all(dir).context("Failed to create transcript directory")?;
        }

        let path = dir.join(format!("{}.json", self.id));
        let json = serde_json::to_string_pretty(self).context("Failed to serialize session")?;

        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write transcript: {:?}", path))?;

        tracing::info!("Saved transcript: {:?} ({} messages)", path, self.len());
        Ok(path)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
