//! Support Agent - 응답 결정 및 장애 경계
//!
//! 1. 지식베이스 매칭 (신뢰도 > 0.5 일 때만 채택, 0.7 미만이면 안내 추가)
//! 2. 대화 응답
//! 3. 폴백 도움말
//!
//! 매칭 중 예기치 못한 패닉은 여기서 잡아 사과 메시지로 바꿉니다.

mod config;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::conversation::{fallback, ConversationalResponder};
use crate::knowledge::{MatchMethod, MatchResult, Matcher};

pub use config::{
    AgentConfig, ConfigError, KnowledgeSource, DEFAULT_ACCEPT_THRESHOLD,
    DEFAULT_CAUTION_THRESHOLD, KNOWLEDGE_ENV, KNOWLEDGE_FILE_NAME,
};

// ============================================================================
// Types
// ============================================================================

/// 응답 출처
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplySource {
    /// 지식베이스 답변
    Knowledge {
        entry: usize,
        confidence: f64,
        method: MatchMethod,
        low_confidence: bool,
    },
    /// 대화 응답
    Conversational,
    /// 폴백 도움말
    Fallback,
    /// 내부 오류
    Error,
}

/// 에이전트 응답 (Markdown 텍스트)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReply {
    pub text: String,
    pub source: ReplySource,
}

impl AgentReply {
    fn error(detail: &str) -> Self {
        Self {
            text: format!(
                "I apologize, but I encountered an error while processing your question: {}. Please try again.",
                detail
            ),
            source: ReplySource::Error,
        }
    }
}

// ============================================================================
// SupportAgent
// ============================================================================

/// 고객지원 에이전트
///
/// 상태를 갖지 않으므로 같은 입력에는 항상 같은 응답을 돌려줍니다.
#[derive(Debug, Clone)]
pub struct SupportAgent {
    matcher: Matcher,
    responder: ConversationalResponder,
    config: AgentConfig,
}

impl SupportAgent {
    /// 구성 요소를 받아 생성
    pub fn new(
        matcher: Matcher,
        responder: ConversationalResponder,
        config: AgentConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            matcher: matcher.with_cutoff(config.fuzzy_cutoff),
            responder,
            config,
        })
    }

    /// 내장 데이터 + 기본 설정
    pub fn builtin() -> Self {
        Self {
            matcher: Matcher::builtin(),
            responder: ConversationalResponder::builtin(),
            config: AgentConfig::default(),
        }
    }

    /// 지식 출처에서 로드
    pub fn load(source: &KnowledgeSource, config: AgentConfig) -> Result<Self> {
        let matcher = match source {
            KnowledgeSource::Builtin => Matcher::builtin(),
            KnowledgeSource::File(path) => {
                Matcher::from_json_file(path).context("Failed to load knowledge file")?
            }
        };

        let agent = Self::new(matcher, ConversationalResponder::builtin(), config)
            .context("Invalid agent configuration")?;

        tracing::info!(
            "Support agent ready ({} entries from {})",
            agent.matcher.knowledge_base().len(),
            source
        );

        Ok(agent)
    }

    /// 사용자 입력에 대한 응답
    pub fn respond(&self, utterance: &str) -> AgentReply {
        guarded(|| self.decide(utterance))
    }

    /// 응답 결정 규칙
    fn decide(&self, utterance: &str) -> AgentReply {
        // 1. 지식베이스
        let result = self.matcher.find_best_match(utterance);
        if let MatchResult {
            answer: Some(answer),
            entry: Some(entry),
            confidence,
            method,
        } = result
        {
            if confidence > self.config.accept_threshold {
                let low_confidence = confidence < self.config.caution_threshold;
                return AgentReply {
                    text: render_answer(&answer, confidence, low_confidence),
                    source: ReplySource::Knowledge {
                        entry,
                        confidence,
                        method,
                        low_confidence,
                    },
                };
            }

            tracing::debug!(
                "Rejected entry #{} (confidence {:.4} <= {})",
                entry,
                confidence,
                self.config.accept_threshold
            );
        }

        // 2. 대화 응답
        if let Some(reply) = self.responder.converse(utterance) {
            return AgentReply {
                text: reply.to_string(),
                source: ReplySource::Conversational,
            };
        }

        // 3. 폴백
        AgentReply {
            text: fallback().to_string(),
            source: ReplySource::Fallback,
        }
    }

    /// 지식베이스 매칭만 수행
    pub fn find_best_match(&self, utterance: &str) -> MatchResult {
        self.matcher.find_best_match(utterance)
    }

    /// 대화 응답만 수행
    pub fn converse(&self, utterance: &str) -> Option<&str> {
        self.responder.converse(utterance)
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn responder(&self) -> &ConversationalResponder {
        &self.responder
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 지식베이스 답변 렌더링
fn render_answer(answer: &str, confidence: f64, low_confidence: bool) -> String {
    let mut text = format!("**Answer:** {}", answer);

    if low_confidence {
        text.push_str(&format!(
            "\n\n*Note: This answer has a confidence score of {:.1}%. If this doesn't fully answer your question, please try rephrasing it.*",
            confidence * 100.0
        ));
    }

    text
}

/// 패닉을 잡아 오류 응답으로 변환
fn guarded<F>(f: F) -> AgentReply
where
    F: FnOnce() -> AgentReply,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(reply) => reply,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            tracing::error!("Error processing question: {}", detail);
            AgentReply::error(&detail)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown internal error".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
