//! 대화 응답기 - 트리거 문구 기반 고정 답변
//!
//! 1. 정규화된 입력이 트리거와 정확히 같으면 그 답변
//! 2. 아니면 정의 순서대로, 트리거 전체 또는 트리거의 단어 하나가
//!    입력의 부분 문자열이면 그 답변 (먼저 등록된 규칙 우선)
//! 3. 없으면 None

/// 트리거 -> 답변 규칙
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationalRule {
    /// 소문자 트리거 문구
    pub trigger: String,
    pub reply: String,
}

impl ConversationalRule {
    pub fn new(trigger: &str, reply: &str) -> Self {
        Self {
            trigger: trigger.trim().to_lowercase(),
            reply: reply.to_string(),
        }
    }

    /// 부분 일치 여부
    fn partially_matches(&self, utterance: &str) -> bool {
        utterance.contains(self.trigger.as_str())
            || self
                .trigger
                .split_whitespace()
                .any(|word| utterance.contains(word))
    }
}

/// 대화 응답기
///
/// 규칙 순서가 곧 우선순위입니다. 짧고 흔한 트리거가 앞에 있으면
/// 뒤쪽의 더 구체적인 트리거를 가릴 수 있습니다.
#[derive(Debug, Clone)]
pub struct ConversationalResponder {
    rules: Vec<ConversationalRule>,
}

impl ConversationalResponder {
    /// 규칙 목록으로 생성 (순서 유지)
    pub fn new(rules: Vec<ConversationalRule>) -> Self {
        Self { rules }
    }

    /// 기본 Thoughtful AI 대화 규칙
    pub fn builtin() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(trigger, reply)| ConversationalRule::new(trigger, reply))
            .collect();
        Self::new(rules)
    }

    /// 대화 응답 검색
    pub fn converse(&self, utterance: &str) -> Option<&str> {
        let normalized = utterance.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        // 1. 정확 일치
        if let Some(rule) = self.rules.iter().find(|r| r.trigger == normalized) {
            tracing::debug!("Conversational exact match: {:?}", rule.trigger);
            return Some(&rule.reply);
        }

        // 2. 부분 일치 (정의 순서)
        let rule = self.rules.iter().find(|r| r.partially_matches(&normalized))?;
        tracing::debug!("Conversational partial match: {:?}", rule.trigger);
        Some(&rule.reply)
    }

    pub fn rules(&self) -> &[ConversationalRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ConversationalResponder {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Built-in Rules
// ============================================================================

const BUILTIN_RULES: [(&str, &str); 12] = [
    // 정체성
    (
        "what's your name",
        "I'm the Thoughtful AI Support Agent, here to help you learn about our automation agents like EVA, CAM, and PHIL.",
    ),
    (
        "who are you",
        "I'm the Thoughtful AI Support Agent, designed to assist with questions about our healthcare automation solutions.",
    ),
    (
        "what are you",
        "I'm an AI assistant specialized in providing information about Thoughtful AI's automation agents and services.",
    ),
    // 인사
    (
        "hello",
        "Hello! I'm here to help you with questions about Thoughtful AI's automation agents. What would you like to know?",
    ),
    (
        "hi",
        "Hi there! I'm the Thoughtful AI Support Agent. How can I assist you today?",
    ),
    (
        "hey",
        "Hey! I'm here to help with any questions about Thoughtful AI's agents. What can I tell you?",
    ),
    // 기능
    (
        "what can you do",
        "I can help answer questions about Thoughtful AI's automation agents including EVA (Eligibility Verification), CAM (Claims Processing), and PHIL (Payment Posting). I can also explain their benefits and how they work.",
    ),
    (
        "how can you help",
        "I can provide detailed information about Thoughtful AI's healthcare automation agents, their features, benefits, and how they can improve your operations.",
    ),
    // 감사
    (
        "thank you",
        "You're welcome! Is there anything else you'd like to know about Thoughtful AI's agents?",
    ),
    (
        "thanks",
        "You're welcome! Feel free to ask if you have any other questions about our automation solutions.",
    ),
    // 작별
    (
        "goodbye",
        "Goodbye! Feel free to return anytime if you have questions about Thoughtful AI's automation agents.",
    ),
    (
        "bye",
        "Bye! Don't hesitate to reach out if you need more information about our AI agents.",
    ),
];

// ============================================================================
// Tests
// ============================================================================
