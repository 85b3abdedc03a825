//! Knowledge Base - 정적 Q&A 지식베이스
//!
//! 생성 시 한 번 로드되고 이후 변경되지 않는 (질문, 답변) 목록입니다.
//! 소문자 질문/답변 시퀀스와 약어 테이블을 미리 계산해 둡니다.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Data Directory
// ============================================================================

/// 데이터 디렉토리 경로 (~/.thoughtful-agent/)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".thoughtful-agent")
}

// ============================================================================
// Errors
// ============================================================================

/// 지식베이스 구성 오류
///
/// 잘못된 데이터로는 에이전트를 시작하지 않습니다.
#[derive(Debug, Error, PartialEq)]
pub enum KnowledgeError {
    #[error("knowledge base has no entries")]
    Empty,

    #[error("entry #{index} has an empty question")]
    EmptyQuestion { index: usize },

    #[error("entry #{index} has an empty answer")]
    EmptyAnswer { index: usize },

    #[error("keyword rule has an empty token")]
    EmptyKeyword,

    #[error("keyword '{keyword}' points to entry #{index}, but only {size} entries exist")]
    KeywordIndexOutOfRange {
        keyword: String,
        index: usize,
        size: usize,
    },
}

// ============================================================================
// Types
// ============================================================================

/// 질문-답변 엔트리
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
}

impl QaEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// 지식 파일의 키워드 테이블 (토큰 -> [(엔트리 인덱스, 가중치)])
pub type RawKeywordTable = HashMap<String, Vec<(usize, u32)>>;

/// 지식 파일 (JSON) 형식
///
/// ```json
/// { "questions": [{ "question": "...", "answer": "..." }],
///   "keywords": { "eva": [[0, 3]] } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeFile {
    pub questions: Vec<QaEntry>,
    /// 생략 시 기본 키워드 테이블 사용
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<RawKeywordTable>,
}

/// 약어와 그 풀이 ("eva" -> "the eligibility verification agent (eva)")
#[derive(Debug, Clone, PartialEq)]
pub struct Acronym {
    pub acronym: String,
    pub expansion: String,
}

// ============================================================================
// KnowledgeBase
// ============================================================================

/// 불변 지식베이스
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<QaEntry>,
    questions: Vec<String>,
    answers: Vec<String>,
    acronyms: Vec<Acronym>,
}

impl KnowledgeBase {
    /// 엔트리 목록으로 생성 (검증 포함)
    pub fn new(entries: Vec<QaEntry>) -> Result<Self, KnowledgeError> {
        if entries.is_empty() {
            return Err(KnowledgeError::Empty);
        }

        for (index, entry) in entries.iter().enumerate() {
            if entry.question.trim().is_empty() {
                return Err(KnowledgeError::EmptyQuestion { index });
            }
            if entry.answer.trim().is_empty() {
                return Err(KnowledgeError::EmptyAnswer { index });
            }
        }

        let questions: Vec<String> = entries.iter().map(|e| e.question.to_lowercase()).collect();
        let answers = entries.iter().map(|e| e.answer.clone()).collect();
        let acronyms = extract_acronyms(&questions);

        tracing::debug!(
            "Knowledge base built: {} entries, {} acronyms",
            entries.len(),
            acronyms.len()
        );

        Ok(Self {
            entries,
            questions,
            answers,
            acronyms,
        })
    }

    /// 내장 Thoughtful AI 지식베이스
    pub fn builtin() -> Self {
        let entries = BUILTIN_QA
            .iter()
            .map(|(q, a)| QaEntry::new(*q, *a))
            .collect();

        // 내장 데이터는 항상 유효
        match Self::new(entries) {
            Ok(kb) => kb,
            Err(e) => unreachable!("built-in knowledge base is invalid: {e}"),
        }
    }

    /// JSON 지식 파일 로드
    ///
    /// 파일에 키워드 테이블이 있으면 함께 반환합니다.
    pub fn from_json_file(path: &Path) -> Result<(Self, Option<RawKeywordTable>)> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge file: {:?}", path))?;

        let file: KnowledgeFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse knowledge file: {:?}", path))?;

        let kb = Self::new(file.questions)
            .with_context(|| format!("Invalid knowledge file: {:?}", path))?;

        tracing::info!("Loaded knowledge base from {:?} ({} entries)", path, kb.len());

        Ok((kb, file.keywords))
    }

    /// 소문자 질문 목록 (순서 유지)
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// 답변 목록 (질문과 같은 순서)
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// 원본 엔트리
    pub fn entries(&self) -> &[QaEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&QaEntry> {
        self.entries.get(index)
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    /// 약어 테이블
    pub fn acronyms(&self) -> &[Acronym] {
        &self.acronyms
    }

    /// 엔트리 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 질문에서 `the <설명> (<약어>)` 형태의 약어를 추출
///
/// 같은 약어가 여러 질문에 있으면 먼저 나온 풀이를 사용합니다.
fn extract_acronyms(questions: &[String]) -> Vec<Acronym> {
    let re = match Regex::new(r"\bthe [a-z][a-z \-]*? \(([a-z0-9]{2,8})\)") {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("Acronym pattern failed to compile: {}", e);
            return Vec::new();
        }
    };

    let mut acronyms: Vec<Acronym> = Vec::new();

    for question in questions {
        for caps in re.captures_iter(question) {
            let (Some(full), Some(acronym)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            // 매치 안에 "the "가 여러 번 있으면 마지막 것부터가 풀이
            let text = full.as_str();
            let start = text.rfind("the ").unwrap_or(0);
            let expansion = text[start..].to_string();
            let acronym = acronym.as_str().to_string();

            if acronyms.iter().all(|a| a.acronym != acronym) {
                acronyms.push(Acronym { acronym, expansion });
            }
        }
    }

    acronyms
}

// ============================================================================
// Built-in Data
// ============================================================================

const BUILTIN_QA: [(&str, &str); 5] = [
    (
        "What does the eligibility verification agent (EVA) do?",
        "EVA automates the process of verifying a patient's eligibility and benefits information in real-time, eliminating manual data entry errors and reducing claim rejections.",
    ),
    (
        "What does the claims processing agent (CAM) do?",
        "CAM streamlines the submission and management of claims, improving accuracy, reducing manual intervention, and accelerating reimbursements.",
    ),
    (
        "How does the payment posting agent (PHIL) work?",
        "PHIL automates the posting of payments to patient accounts, ensuring fast, accurate reconciliation of payments and reducing administrative burden.",
    ),
    (
        "Tell me about Thoughtful AI's Agents.",
        "Thoughtful AI provides a suite of AI-powered automation agents designed to streamline healthcare processes. These include Eligibility Verification (EVA), Claims Processing (CAM), and Payment Posting (PHIL), among others.",
    ),
    (
        "What are the benefits of using Thoughtful AI's agents?",
        "Using Thoughtful AI's Agents can significantly reduce administrative costs, improve operational efficiency, and reduce errors in critical processes like claims management and payment posting.",
    ),
];

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_knowledge_base() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.len(), 5);
        assert_eq!(kb.size(), 5);
        assert_eq!(kb.questions().len(), kb.answers().len());
        assert_eq!(
            kb.questions()[0],
            "what does the eligibility verification agent (eva) do?"
        );
        assert!(kb.answers()[2].starts_with("PHIL automates"));
    }

    #[test]
    fn test_builtin_acronyms() {
        let kb = KnowledgeBase::builtin();
        let acronyms: Vec<&str> = kb.acronyms().iter().map(|a| a.acronym.as_str()).collect();
        assert_eq!(acronyms, vec!["eva", "cam", "phil"]);
        assert_eq!(
            kb.acronyms()[0].expansion,
            "the eligibility verification agent (eva)"
        );
        assert_eq!(kb.acronyms()[2].expansion, "the payment posting agent (phil)");
    }

    #[test]
    fn test_acronym_uses_last_article() {
        let questions = vec!["is the report about the billing robot (bob)?".to_string()];
        let acronyms = extract_acronyms(&questions);
        assert_eq!(acronyms.len(), 1);
        assert_eq!(acronyms[0].expansion, "the billing robot (bob)");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(KnowledgeBase::new(vec![]).err(), Some(KnowledgeError::Empty));
    }

    #[test]
    fn test_rejects_blank_fields() {
        let err = KnowledgeBase::new(vec![
            QaEntry::new("What?", "This."),
            QaEntry::new("   ", "Answer"),
        ])
        .err();
        assert_eq!(err, Some(KnowledgeError::EmptyQuestion { index: 1 }));

        let err = KnowledgeBase::new(vec![QaEntry::new("Question?", "")]).err();
        assert_eq!(err, Some(KnowledgeError::EmptyAnswer { index: 0 }));
    }

    #[test]
    fn test_from_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("knowledge.json");
        std::fs::write(
            &path,
            r#"{
                "questions": [
                    {"question": "What is Rust?", "answer": "A systems language."},
                    {"question": "What is Cargo?", "answer": "Rust's build tool."}
                ],
                "keywords": {"cargo": [[1, 3]]}
            }"#,
        )
        .unwrap();

        let (kb, keywords) = KnowledgeBase::from_json_file(&path).unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.questions()[1], "what is cargo?");
        assert_eq!(kb.answer(1), Some("Rust's build tool."));

        let keywords = keywords.unwrap();
        assert_eq!(keywords.get("cargo"), Some(&vec![(1, 3)]));
    }

    #[test]
    fn test_from_json_file_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"questions": [{"question": "", "answer": "x"}]}"#).unwrap();

        let err = KnowledgeBase::from_json_file(&path).err().unwrap();
        assert!(format!("{:#}", err).contains("empty question"));

        let missing = dir.path().join("missing.json");
        assert!(KnowledgeBase::from_json_file(&missing).is_err());
    }
}
