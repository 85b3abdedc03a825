//! thoughtful-agent - 고객지원 에이전트
//!
//! Thoughtful AI 자동화 에이전트(EVA, CAM, PHIL)에 대한 질문에
//! 내장 Q&A 지식베이스로 답변합니다.
//!
//! 퍼지 문자열 매칭 -> 가중치 키워드 매칭 -> 대화 응답 -> 폴백 순서로
//! 응답을 결정합니다.

pub mod agent;
pub mod cli;
pub mod conversation;
pub mod knowledge;
pub mod session;

// Re-exports
pub use agent::{AgentConfig, AgentReply, ConfigError, KnowledgeSource, ReplySource, SupportAgent};
pub use conversation::{fallback, ConversationalResponder, ConversationalRule, FALLBACK_MESSAGE};
pub use knowledge::{
    get_data_dir, similarity, KeywordRules, KnowledgeBase, KnowledgeError, MatchMethod,
    MatchResult, Matcher, QaEntry,
};
pub use session::{ChatMessage, ChatSession, Role};
