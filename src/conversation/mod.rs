//! 대화 응답 모듈
//!
//! 지식베이스에 없는 일상 대화(인사, 감사, 정체성 질문 등)에
//! 정해진 답변을 돌려줍니다.
//!
//! - Responder: 트리거 문구 -> 고정 답변 (정확 일치 후 부분 일치)
//! - Fallback: 어떤 매칭도 없을 때의 도움말

mod fallback;
mod responder;

// Re-exports
pub use fallback::{fallback, FALLBACK_MESSAGE};
pub use responder::{ConversationalResponder, ConversationalRule};
