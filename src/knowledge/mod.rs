//! Knowledge 모듈 - FAQ 매칭 엔진
//!
//! - Base: 불변 Q&A 지식베이스 + 약어 테이블
//! - Similarity: Ratcliff/Obershelp 문자열 유사도
//! - Fuzzy: 질문 전체 유사도 매칭 (컷오프 0.5)
//! - Keyword: 가중치 합산 키워드 폴백
//! - Matcher: 퍼지 -> 키워드 순서로 통합

mod base;
mod similarity;
mod fuzzy;
mod keyword;
mod matcher;

// Re-exports
pub use base::{
    Acronym, KnowledgeBase, KnowledgeError, KnowledgeFile, QaEntry, RawKeywordTable,
    get_data_dir,
};
pub use similarity::{similarity, SequenceMatcher};
pub use fuzzy::{
    best_fuzzy_match, expand_acronyms, normalize, FuzzyMatch, DEFAULT_FUZZY_CUTOFF,
};
pub use keyword::{
    best_keyword_match, keyword_confidence, keyword_scores, tokenize, KeywordRules,
    KEYWORD_CONFIDENCE_CAP, KEYWORD_CONFIDENCE_PER_POINT,
};
pub use matcher::{MatchMethod, MatchResult, Matcher, ScoreBreakdown};
