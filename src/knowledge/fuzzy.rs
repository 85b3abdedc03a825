//! 퍼지 매칭 - 질문 전체 문자열 유사도
//!
//! 정규화된 입력을 모든 지식베이스 질문과 비교해 가장 비슷한
//! 하나를 고릅니다. 컷오프 미만이면 매칭 없음으로 처리합니다.

use std::borrow::Cow;

use super::base::{Acronym, KnowledgeBase};
use super::similarity::SequenceMatcher;

/// 기본 퍼지 컷오프
pub const DEFAULT_FUZZY_CUTOFF: f64 = 0.5;

/// 키워드 토크나이저와 같은 구두점 집합
const TOKEN_PUNCTUATION: [char; 4] = ['.', ',', '!', '?'];

/// 퍼지 매칭 결과
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch {
    /// 엔트리 인덱스
    pub index: usize,
    /// 유사도 (= 신뢰도)
    pub similarity: f64,
}

/// 입력 정규화 (소문자 + 양끝 공백 제거)
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 알려진 약어를 풀이로 확장
///
/// `eva` 토큰은 `the eligibility verification agent (eva)`로 바뀝니다.
/// 이미 풀이가 들어 있는 입력이나 약어가 없는 입력은 그대로 반환합니다.
pub fn expand_acronyms<'a>(text: &'a str, acronyms: &[Acronym]) -> Cow<'a, str> {
    if acronyms.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut expanded = false;
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            let core = word.trim_matches(&TOKEN_PUNCTUATION[..]);
            let hit = acronyms
                .iter()
                .find(|a| a.acronym == core && !text.contains(a.expansion.as_str()));

            match hit {
                Some(a) => {
                    expanded = true;
                    word.replacen(core, &a.expansion, 1)
                }
                None => word.to_string(),
            }
        })
        .collect();

    if expanded {
        Cow::Owned(words.join(" "))
    } else {
        Cow::Borrowed(text)
    }
}

/// 엔트리별 유사도 (정규화된 입력 기준, 약어 확장 포함)
pub fn fuzzy_scores(kb: &KnowledgeBase, normalized: &str) -> Vec<f64> {
    let query = expand_acronyms(normalized, kb.acronyms());
    kb.questions()
        .iter()
        .map(|q| SequenceMatcher::new(&query, q).ratio())
        .collect()
}

/// 가장 비슷한 질문 선택
///
/// `normalized`는 이미 [`normalize`]를 거친 문자열이어야 합니다.
/// 동점이면 지식베이스에서 먼저 나온 질문이 이깁니다.
pub fn best_fuzzy_match(kb: &KnowledgeBase, normalized: &str, cutoff: f64) -> Option<FuzzyMatch> {
    if normalized.is_empty() {
        return None;
    }

    let query = expand_acronyms(normalized, kb.acronyms());
    if let Cow::Owned(ref expanded) = query {
        tracing::debug!("Expanded acronyms: {:?} -> {:?}", normalized, expanded);
    }

    let mut best: Option<FuzzyMatch> = None;

    for (index, question) in kb.questions().iter().enumerate() {
        let matcher = SequenceMatcher::new(&query, question);

        // 상한값이 컷오프에도 못 미치면 전체 계산 생략
        if matcher.real_quick_ratio() < cutoff || matcher.quick_ratio() < cutoff {
            continue;
        }

        let similarity = matcher.ratio();
        if similarity < cutoff {
            continue;
        }

        match best {
            Some(current) if similarity <= current.similarity => {}
            _ => best = Some(FuzzyMatch { index, similarity }),
        }
    }

    best
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::base::QaEntry;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  What Does EVA Do?  "), "what does eva do?");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_expand_acronyms() {
        let kb = KnowledgeBase::builtin();

        assert_eq!(
            expand_acronyms("what does eva do?", kb.acronyms()),
            "what does the eligibility verification agent (eva) do?"
        );
        assert_eq!(
            expand_acronyms("tell me about phil!", kb.acronyms()),
            "tell me about the payment posting agent (phil)!"
        );

        // 확장할 약어가 없으면 원본 그대로
        assert!(matches!(
            expand_acronyms("who are you?", kb.acronyms()),
            Cow::Borrowed(_)
        ));

        // 단어 일부는 확장하지 않음
        assert!(matches!(
            expand_acronyms("camera evaluation", kb.acronyms()),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_expand_skips_verbatim_question() {
        let kb = KnowledgeBase::builtin();
        let question = kb.questions()[0].clone();
        assert_eq!(expand_acronyms(&question, kb.acronyms()), question);
    }

    #[test]
    fn test_best_fuzzy_match_eva() {
        let kb = KnowledgeBase::builtin();
        let m = best_fuzzy_match(&kb, "what does eva do?", DEFAULT_FUZZY_CUTOFF).unwrap();
        assert_eq!(m.index, 0);
        assert!(m.similarity > 0.99);
    }

    #[test]
    fn test_verbatim_questions_match_themselves() {
        let kb = KnowledgeBase::builtin();
        for (index, question) in kb.questions().iter().enumerate() {
            let m = best_fuzzy_match(&kb, question, DEFAULT_FUZZY_CUTOFF).unwrap();
            assert_eq!(m.index, index);
            assert!(m.similarity >= 0.99);
        }
    }

    #[test]
    fn test_below_cutoff() {
        let kb = KnowledgeBase::builtin();
        assert!(best_fuzzy_match(&kb, "weather", DEFAULT_FUZZY_CUTOFF).is_none());
        assert!(best_fuzzy_match(&kb, "how do i cook pasta?", DEFAULT_FUZZY_CUTOFF).is_none());
        assert!(best_fuzzy_match(&kb, "", DEFAULT_FUZZY_CUTOFF).is_none());
    }

    #[test]
    fn test_cutoff_is_inclusive() {
        let kb = KnowledgeBase::builtin();
        // "eligibility verification" -> EVA 0.6154
        assert!(best_fuzzy_match(&kb, "eligibility verification", 0.6).is_some());
        assert!(best_fuzzy_match(&kb, "eligibility verification", 0.62).is_none());
    }

    #[test]
    fn test_tie_prefers_first_entry() {
        let kb = KnowledgeBase::new(vec![
            QaEntry::new("abcd", "first"),
            QaEntry::new("abcd", "second"),
        ])
        .unwrap();

        let m = best_fuzzy_match(&kb, "abcd", DEFAULT_FUZZY_CUTOFF).unwrap();
        assert_eq!(m.index, 0);
    }

    #[test]
    fn test_fuzzy_scores_len() {
        let kb = KnowledgeBase::builtin();
        let scores = fuzzy_scores(&kb, "what does eva do?");
        assert_eq!(scores.len(), kb.len());
        assert!(scores[0] > scores[1]);
    }
}
