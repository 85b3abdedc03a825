//! 문자열 유사도 - Ratcliff/Obershelp 시퀀스 매칭
//!
//! 최장 공통 블록을 찾고 좌/우 구간을 재귀적으로 처리하여
//! 매칭된 문자 수(M)를 구한 뒤 `2·M / T` 비율을 계산합니다.
//!
//! ref: https://xlinux.nist.gov/dads/HTML/ratcliffObershelp.html

use std::collections::HashMap;

/// 인기 문자 제거(autojunk)를 적용하는 최소 길이
const AUTOJUNK_MIN_LEN: usize = 200;

// ============================================================================
// SequenceMatcher
// ============================================================================

/// 두 문자열의 문자 단위 매칭기
///
/// `b` 쪽 문자의 위치 인덱스를 미리 만들어 두고
/// `a`를 순회하며 최장 매칭 블록을 찾습니다.
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    /// b의 문자 -> 등장 위치 (오름차순)
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    /// 매칭기 생성
    ///
    /// `b`가 200자 이상이면 전체의 1%를 넘게 등장하는 문자를
    /// 인덱스에서 제외합니다 (긴 입력에서 공백 등이 지배하는 것 방지).
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, c) in b.iter().enumerate() {
            b2j.entry(*c).or_default().push(j);
        }

        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, idxs| idxs.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// `a[alo..ahi]`와 `b[blo..bhi]` 사이의 최장 매칭 블록
    ///
    /// 동일 길이 블록이 여럿이면 a에서 가장 먼저 시작하는 블록,
    /// 그중에서도 b에서 가장 먼저 시작하는 블록을 반환합니다.
    /// 반환값: (i, j, size)
    fn find_longest_match(
        &self,
        alo: usize,
        ahi: usize,
        blo: usize,
        bhi: usize,
    ) -> (usize, usize, usize) {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);

        // j -> a[i-1]에서 끝나는 매칭 길이
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();

            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }

                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);

                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }

            j2len = new_j2len;
        }

        // 인덱스에서 빠진 인기 문자도 블록 양끝에서는 이어 붙임
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// 매칭 블록 목록 (a 기준 정렬, 인접 블록 병합)
    pub fn matching_blocks(&self) -> Vec<(usize, usize, usize)> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }

            blocks.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        blocks.sort_unstable();

        let mut merged: Vec<(usize, usize, usize)> = Vec::with_capacity(blocks.len());
        for (i, j, k) in blocks {
            if let Some(last) = merged.last_mut() {
                if last.0 + last.2 == i && last.1 + last.2 == j {
                    last.2 += k;
                    continue;
                }
            }
            merged.push((i, j, k));
        }

        merged
    }

    /// 유사도 비율 (0.0 ~ 1.0)
    pub fn ratio(&self) -> f64 {
        let matches: usize = self.matching_blocks().iter().map(|&(_, _, k)| k).sum();
        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// 문자 빈도 교집합 기반 상한값 (ratio 이상이 보장됨)
    pub fn quick_ratio(&self) -> f64 {
        let mut available: HashMap<char, isize> = HashMap::new();
        for c in &self.b {
            *available.entry(*c).or_insert(0) += 1;
        }

        let mut matches = 0usize;
        for c in &self.a {
            let count = available.entry(*c).or_insert(0);
            if *count > 0 {
                matches += 1;
            }
            *count -= 1;
        }

        calculate_ratio(matches, self.a.len() + self.b.len())
    }

    /// 길이만으로 계산한 상한값 (quick_ratio 이상이 보장됨)
    pub fn real_quick_ratio(&self) -> f64 {
        let (la, lb) = (self.a.len(), self.b.len());
        calculate_ratio(la.min(lb), la + lb)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

#[inline]
fn calculate_ratio(matches: usize, length: usize) -> f64 {
    if length == 0 {
        1.0
    } else {
        2.0 * matches as f64 / length as f64
    }
}

/// 두 문자열의 Ratcliff/Obershelp 유사도
pub fn similarity(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(a, b).ratio()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_identical_strings() {
        assert!(approx(similarity("hello world", "hello world"), 1.0));
    }

    #[test]
    fn test_empty_strings() {
        assert!(approx(similarity("", ""), 1.0));
        assert!(approx(similarity("abc", ""), 0.0));
        assert!(approx(similarity("", "abc"), 0.0));
    }

    #[test]
    fn test_disjoint_strings() {
        assert!(approx(similarity("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_known_ratio() {
        // "abcd" vs "bcde": 공통 블록 "bcd" (3) -> 2*3/8
        assert!(approx(similarity("abcd", "bcde"), 0.75));

        // 서로 다른 위치의 블록 두 개: "ab" + "cd"
        let m = SequenceMatcher::new("abxcd", "abcd");
        assert_eq!(m.matching_blocks(), vec![(0, 0, 2), (3, 2, 2)]);
        assert!(approx(m.ratio(), 8.0 / 9.0));
    }

    #[test]
    fn test_question_ratios() {
        // 실제 지식베이스 질문에 대한 기대값
        let cam = "what does the claims processing agent (cam) do?";
        let eva = "what does the eligibility verification agent (eva) do?";

        assert!(approx(similarity("what does eva do?", cam), 0.5));
        assert!(approx(similarity("what does eva do?", eva), 0.4789));
        assert!(approx(similarity("eligibility verification", eva), 0.6154));
    }

    #[test]
    fn test_upper_bounds() {
        let pairs = [
            ("what does eva do?", "what does the claims processing agent (cam) do?"),
            ("weather", "tell me about thoughtful ai's agents."),
            ("abc", "cba"),
        ];

        for (a, b) in pairs {
            let m = SequenceMatcher::new(a, b);
            assert!(m.real_quick_ratio() >= m.quick_ratio());
            assert!(m.quick_ratio() >= m.ratio());
        }
    }

    #[test]
    fn test_unicode_is_char_level() {
        // 멀티바이트 문자도 한 글자로 계산
        assert!(approx(similarity("안녕", "안녕"), 1.0));
        assert!(approx(similarity("안녕하세요", "안녕"), 4.0 / 7.0));
    }

    #[test]
    fn test_autojunk_long_sequence() {
        // 200자 이상에서도 패닉 없이 [0, 1] 범위
        let long = "a ".repeat(150);
        let r = similarity("a a a", &long);
        assert!((0.0..=1.0).contains(&r));
    }
}
