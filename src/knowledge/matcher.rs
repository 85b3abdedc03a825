//! 매처 - 퍼지 매칭 + 키워드 폴백 통합
//!
//! 1. 퍼지 매칭 (질문 전체 유사도, 컷오프 0.5)
//! 2. 실패 시 키워드 매칭 (가중치 합산)
//! 3. 둘 다 실패하면 `MatchResult::none()`

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::base::{KnowledgeBase, KnowledgeError};
use super::fuzzy::{best_fuzzy_match, fuzzy_scores, normalize, DEFAULT_FUZZY_CUTOFF};
use super::keyword::{best_keyword_match, keyword_scores, KeywordRules};

// ============================================================================
// Types
// ============================================================================

/// 매칭 방법
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    /// 질문 전체 유사도
    Fuzzy,
    /// 키워드 가중치
    Keyword,
    /// 매칭 없음
    None,
}

/// 매칭 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// 답변 (없으면 None)
    pub answer: Option<String>,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 매칭된 엔트리 인덱스
    pub entry: Option<usize>,
    /// 매칭 방법
    pub method: MatchMethod,
}

impl MatchResult {
    /// 매칭 없음
    pub fn none() -> Self {
        Self {
            answer: None,
            confidence: 0.0,
            entry: None,
            method: MatchMethod::None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.answer.is_some()
    }
}

/// 엔트리별 점수 분석 (inspect 명령어용)
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    /// 약어 확장 전 정규화 입력
    pub normalized: String,
    /// 엔트리별 퍼지 유사도
    pub fuzzy: Vec<f64>,
    /// 엔트리별 키워드 점수
    pub keyword: Vec<u32>,
}

// ============================================================================
// Matcher
// ============================================================================

/// 지식베이스 매처
///
/// 생성 후 읽기 전용이므로 `Arc`로 여러 호출자가 공유할 수 있습니다.
#[derive(Debug, Clone)]
pub struct Matcher {
    kb: KnowledgeBase,
    rules: KeywordRules,
    cutoff: f64,
}

impl Matcher {
    /// 지식베이스와 키워드 규칙으로 생성
    ///
    /// 키워드 규칙이 존재하지 않는 엔트리를 가리키면 실패합니다.
    pub fn new(kb: KnowledgeBase, rules: KeywordRules) -> Result<Self, KnowledgeError> {
        rules.validate(&kb)?;

        Ok(Self {
            kb,
            rules,
            cutoff: DEFAULT_FUZZY_CUTOFF,
        })
    }

    /// 내장 지식베이스 + 기본 키워드 테이블
    pub fn builtin() -> Self {
        Self {
            kb: KnowledgeBase::builtin(),
            rules: KeywordRules::builtin(),
            cutoff: DEFAULT_FUZZY_CUTOFF,
        }
    }

    /// JSON 지식 파일로 생성
    ///
    /// 파일에 키워드 테이블이 없으면 기본 테이블을 사용합니다.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let (kb, table) = KnowledgeBase::from_json_file(path)?;

        let rules = match table {
            Some(table) => KeywordRules::from_table(table),
            None => {
                tracing::debug!("No keyword table in {:?}, using built-in rules", path);
                KeywordRules::builtin()
            }
        };

        Self::new(kb, rules).with_context(|| format!("Invalid keyword rules for {:?}", path))
    }

    /// 퍼지 컷오프 지정
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// 최적 답변 검색 (퍼지 -> 키워드)
    pub fn find_best_match(&self, utterance: &str) -> MatchResult {
        let normalized = normalize(utterance);
        if normalized.is_empty() {
            return MatchResult::none();
        }

        // 1. 퍼지 매칭
        if let Some(m) = best_fuzzy_match(&self.kb, &normalized, self.cutoff) {
            tracing::debug!(
                "Fuzzy match: entry #{} (similarity {:.4})",
                m.index,
                m.similarity
            );

            return MatchResult {
                answer: self.kb.answer(m.index).map(str::to_string),
                confidence: m.similarity,
                entry: Some(m.index),
                method: MatchMethod::Fuzzy,
            };
        }

        // 2. 키워드 폴백
        self.keyword_match(&normalized)
    }

    /// 키워드 매칭만 수행
    pub fn keyword_match(&self, utterance: &str) -> MatchResult {
        let scores = keyword_scores(&self.rules, self.kb.len(), utterance);

        match best_keyword_match(&scores) {
            Some((index, score, confidence)) => {
                tracing::debug!(
                    "Keyword match: entry #{} (score {}, confidence {:.2})",
                    index,
                    score,
                    confidence
                );

                MatchResult {
                    answer: self.kb.answer(index).map(str::to_string),
                    confidence,
                    entry: Some(index),
                    method: MatchMethod::Keyword,
                }
            }
            None => {
                tracing::debug!("No knowledge match for {:?}", utterance);
                MatchResult::none()
            }
        }
    }

    /// 엔트리별 퍼지/키워드 점수
    pub fn breakdown(&self, utterance: &str) -> ScoreBreakdown {
        let normalized = normalize(utterance);

        ScoreBreakdown {
            fuzzy: fuzzy_scores(&self.kb, &normalized),
            keyword: keyword_scores(&self.rules, self.kb.len(), &normalized),
            normalized,
        }
    }

    /// 내부 지식베이스 접근
    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// 내부 키워드 규칙 접근
    pub fn rules(&self) -> &KeywordRules {
        &self.rules
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::base::QaEntry;
    use tempfile::TempDir;

    #[test]
    fn test_verbatim_questions() {
        let matcher = Matcher::builtin();
        let kb = matcher.knowledge_base().clone();

        for (i, entry) in kb.entries().iter().enumerate() {
            let variants = [
                entry.question.clone(),
                entry.question.to_uppercase(),
                format!("   {}  \n", entry.question),
            ];

            for variant in variants {
                let result = matcher.find_best_match(&variant);
                assert_eq!(result.entry, Some(i), "variant: {variant:?}");
                assert_eq!(result.answer.as_deref(), Some(entry.answer.as_str()));
                assert!(result.confidence >= 0.99);
                assert_eq!(result.method, MatchMethod::Fuzzy);
            }
        }
    }

    #[test]
    fn test_what_does_eva_do() {
        let matcher = Matcher::builtin();
        let result = matcher.find_best_match("What does EVA do?");

        assert_eq!(result.entry, Some(0));
        assert!(result.answer.unwrap().starts_with("EVA automates"));
        assert!(result.confidence > 0.5);
    }

    #[test]
    fn test_acronym_questions() {
        let matcher = Matcher::builtin();

        assert_eq!(matcher.find_best_match("Tell me about CAM").entry, Some(1));
        assert_eq!(matcher.find_best_match("How does PHIL work?").entry, Some(2));
        assert_eq!(matcher.find_best_match("EVA agent").entry, Some(0));
    }

    #[test]
    fn test_weather_has_no_match() {
        let matcher = Matcher::builtin();
        let result = matcher.find_best_match("weather");

        assert_eq!(result, MatchResult::none());
        assert_eq!(result.confidence, 0.0);
        assert!(!result.is_match());
    }

    #[test]
    fn test_empty_input() {
        let matcher = Matcher::builtin();
        assert_eq!(matcher.find_best_match(""), MatchResult::none());
        assert_eq!(matcher.find_best_match("   \t\n"), MatchResult::none());
    }

    #[test]
    fn test_keyword_fallback() {
        let matcher = Matcher::builtin();

        // 퍼지 컷오프를 넘지 못하고 키워드로 잡히는 입력
        let result = matcher.find_best_match("payment posting");
        assert_eq!(result.method, MatchMethod::Keyword);
        assert_eq!(result.entry, Some(2));
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_match_additive() {
        let matcher = Matcher::builtin();
        let result = matcher.keyword_match("eligibility verification");

        assert_eq!(result.entry, Some(0));
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_keyword_confidence_never_exceeds_cap() {
        let matcher = Matcher::builtin();
        let inputs = [
            "eva eva eva eva eva",
            "benefits advantages why benefits advantages why",
            "claims processing cam claims cam",
        ];

        for input in inputs {
            let result = matcher.keyword_match(input);
            assert!(result.confidence <= 0.9, "{input}");
        }
    }

    #[test]
    fn test_keyword_weights_do_not_overflow() {
        let kb = KnowledgeBase::new(vec![QaEntry::new("Only one?", "Yes.")]).unwrap();
        let rules = KeywordRules::new().with_rule("big", &[(0, u32::MAX)]);
        let matcher = Matcher::new(kb, rules).unwrap();

        let result = matcher.find_best_match("big big");
        assert_eq!(result.entry, Some(0));
        assert_eq!(result.method, MatchMethod::Keyword);
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent() {
        let matcher = Matcher::builtin();
        for input in ["What does EVA do?", "payment posting", "weather", ""] {
            assert_eq!(matcher.find_best_match(input), matcher.find_best_match(input));
        }
    }

    #[test]
    fn test_rejects_out_of_range_rules() {
        let kb = KnowledgeBase::new(vec![QaEntry::new("One?", "One.")]).unwrap();
        let err = Matcher::new(kb, KeywordRules::builtin()).unwrap_err();
        assert!(matches!(err, KnowledgeError::KeywordIndexOutOfRange { .. }));
    }

    #[test]
    fn test_from_json_file_with_rules() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(
            &path,
            r#"{
                "questions": [
                    {"question": "How do I reset my password?", "answer": "Use the reset link."},
                    {"question": "Where can I download invoices?", "answer": "Under Billing."}
                ],
                "keywords": {"invoice": [[1, 4]], "password": [[0, 4]]}
            }"#,
        )
        .unwrap();

        let matcher = Matcher::from_json_file(&path).unwrap();
        assert_eq!(matcher.knowledge_base().len(), 2);

        let result = matcher.find_best_match("how do i reset my password?");
        assert_eq!(result.entry, Some(0));
        assert_eq!(result.method, MatchMethod::Fuzzy);

        let result = matcher.find_best_match("invoice");
        assert_eq!(result.entry, Some(1));
        assert_eq!(result.method, MatchMethod::Keyword);
    }

    #[test]
    fn test_from_json_file_without_rules_needs_matching_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(
            &path,
            r#"{"questions": [{"question": "Single?", "answer": "Yes."}]}"#,
        )
        .unwrap();

        let err = Matcher::from_json_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("only 1 entries exist"));
    }

    #[test]
    fn test_breakdown() {
        let matcher = Matcher::builtin();
        let breakdown = matcher.breakdown("  Eligibility Verification ");

        assert_eq!(breakdown.normalized, "eligibility verification");
        assert_eq!(breakdown.fuzzy.len(), 5);
        assert_eq!(breakdown.keyword, vec![4, 0, 0, 0, 0]);
    }

    #[test]
    fn test_matcher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Matcher>();
    }
}
