//! 폴백 도움말

/// 매칭 실패 시 안내 메시지
pub const FALLBACK_MESSAGE: &str = "\
I'm here to help with questions about Thoughtful AI's automation agents. I can provide information about:

• **EVA** - Eligibility Verification Agent
• **CAM** - Claims Processing Agent  
• **PHIL** - Payment Posting Agent
• General benefits and features of our AI agents

Please try rephrasing your question or ask about one of these specific topics. For example:
- \"What does EVA do?\"
- \"Tell me about claims processing\"
- \"What are the benefits of using Thoughtful AI's agents?\"
";

/// 폴백 도움말 반환
pub fn fallback() -> &'static str {
    FALLBACK_MESSAGE
}
