//! 키워드 매칭 - 가중치 기반 폴백 검색
//!
//! 퍼지 매칭이 컷오프를 넘지 못했을 때만 사용됩니다.
//! 토큰별 가중치를 엔트리 점수에 더하고(최댓값이 아니라 합산),
//! 최고 점수 엔트리를 `min(score × 0.15, 0.9)` 신뢰도로 반환합니다.

use std::collections::HashMap;

use super::base::{KnowledgeBase, KnowledgeError, RawKeywordTable};

/// 키워드 점수 1점당 신뢰도
pub const KEYWORD_CONFIDENCE_PER_POINT: f64 = 0.15;

/// 키워드 경로 신뢰도 상한
pub const KEYWORD_CONFIDENCE_CAP: f64 = 0.9;

/// 토큰 양끝에서 제거할 구두점
const TOKEN_PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

// ============================================================================
// KeywordRules
// ============================================================================

/// 키워드 규칙 (소문자 토큰 -> [(엔트리 인덱스, 가중치)])
#[derive(Debug, Clone, Default)]
pub struct KeywordRules {
    rules: HashMap<String, Vec<(usize, u32)>>,
}

impl KeywordRules {
    /// 빈 규칙 집합
    pub fn new() -> Self {
        Self::default()
    }

    /// 규칙 추가 (같은 토큰은 누적)
    pub fn with_rule(mut self, keyword: &str, targets: &[(usize, u32)]) -> Self {
        self.rules
            .entry(keyword.to_lowercase())
            .or_default()
            .extend_from_slice(targets);
        self
    }

    /// Thoughtful AI 기본 키워드 테이블
    ///
    /// 엔트리 0..4 = EVA, CAM, PHIL, 에이전트 일반, 장점
    pub fn builtin() -> Self {
        Self::new()
            .with_rule("eva", &[(0, 3)])
            .with_rule("eligibility", &[(0, 2)])
            .with_rule("verification", &[(0, 2)])
            .with_rule("cam", &[(1, 3)])
            .with_rule("claims", &[(1, 2)])
            .with_rule("processing", &[(1, 1)])
            .with_rule("phil", &[(2, 3)])
            .with_rule("payment", &[(2, 2)])
            .with_rule("posting", &[(2, 2)])
            .with_rule("agents", &[(3, 2)])
            .with_rule("thoughtful", &[(3, 1)])
            .with_rule("benefits", &[(4, 3)])
            .with_rule("advantages", &[(4, 2)])
            .with_rule("why", &[(4, 1)])
    }

    /// 지식 파일의 테이블로 생성
    pub fn from_table(table: RawKeywordTable) -> Self {
        table
            .into_iter()
            .fold(Self::new(), |rules, (keyword, targets)| {
                rules.with_rule(&keyword, &targets)
            })
    }

    /// 지식베이스 크기에 대해 검증
    pub fn validate(&self, kb: &KnowledgeBase) -> Result<(), KnowledgeError> {
        for (keyword, targets) in &self.rules {
            if keyword.trim().is_empty() {
                return Err(KnowledgeError::EmptyKeyword);
            }

            for &(index, _) in targets {
                if index >= kb.len() {
                    return Err(KnowledgeError::KeywordIndexOutOfRange {
                        keyword: keyword.clone(),
                        index,
                        size: kb.len(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, keyword: &str) -> Option<&[(usize, u32)]> {
        self.rules.get(keyword).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// 공백 분리 + 양끝 구두점 제거 + 소문자화
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(&TOKEN_PUNCTUATION[..]).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// 엔트리별 키워드 점수 (지식베이스 순서)
pub fn keyword_scores(rules: &KeywordRules, entry_count: usize, text: &str) -> Vec<u32> {
    let mut scores = vec![0u32; entry_count];

    for token in tokenize(text) {
        if let Some(targets) = rules.get(&token) {
            for &(index, weight) in targets {
                if let Some(score) = scores.get_mut(index) {
                    *score = score.saturating_add(weight);
                }
            }
        }
    }

    scores
}

/// 최고 점수 엔트리 선택
///
/// 동점이면 앞선 엔트리. 모든 점수가 0이면 None.
/// 반환값: (엔트리 인덱스, 점수, 신뢰도)
pub fn best_keyword_match(scores: &[u32]) -> Option<(usize, u32, f64)> {
    let mut best: Option<(usize, u32)> = None;

    for (index, &score) in scores.iter().enumerate() {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }

    match best {
        Some((index, score)) if score > 0 => Some((index, score, keyword_confidence(score))),
        _ => None,
    }
}

/// 점수 -> 신뢰도 (상한 0.9)
#[inline]
pub fn keyword_confidence(score: u32) -> f64 {
    (score as f64 * KEYWORD_CONFIDENCE_PER_POINT).min(KEYWORD_CONFIDENCE_CAP)
}

// ============================================================================
// Tests
// ============================================================================
