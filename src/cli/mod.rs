//! CLI 모듈
//!
//! thoughtful-agent CLI 명령어 정의 및 구현

use std::borrow::Cow;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::agent::{AgentConfig, KnowledgeSource, ReplySource, SupportAgent};
use crate::conversation::fallback;
use crate::knowledge::get_data_dir;
use crate::session::{ChatSession, Role};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "thoughtful-agent")]
#[command(version, about = "Thoughtful AI 고객지원 에이전트", long_about = None)]
pub struct Cli {
    /// 지식 파일 경로 (JSON)
    #[arg(short, long, global = true)]
    pub knowledge: Option<PathBuf>,

    /// 답변 채택 임계값 (초과)
    #[arg(long, global = true)]
    pub accept_threshold: Option<f64>,

    /// 낮은 신뢰도 안내 임계값 (미만)
    #[arg(long, global = true)]
    pub caution_threshold: Option<f64>,

    /// 퍼지 매칭 컷오프 (이상)
    #[arg(long, global = true)]
    pub fuzzy_cutoff: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 질문 하나에 답변
    Ask {
        /// 질문
        question: String,

        /// JSON 형식으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 대화형 채팅
    Chat {
        /// 종료 시 트랜스크립트 저장
        #[arg(long)]
        save: bool,
    },

    /// 질문별 점수 확인
    Inspect {
        /// 질문
        question: String,
    },

    /// 지원 주제 목록
    Topics,

    /// 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    let config = build_config(&cli)?;
    let source = KnowledgeSource::resolve(cli.knowledge.clone());

    match cli.command {
        Commands::Ask { question, json } => {
            let agent = SupportAgent::load(&source, config)?;
            cmd_ask(&agent, &question, json).await
        }
        Commands::Chat { save } => {
            let agent = SupportAgent::load(&source, config)?;
            cmd_chat(&agent, save).await
        }
        Commands::Inspect { question } => {
            let agent = SupportAgent::load(&source, config)?;
            cmd_inspect(&agent, &question).await
        }
        Commands::Topics => cmd_topics().await,
        Commands::Status => cmd_status(&source, config).await,
    }
}

/// 기본 설정 + 플래그 덮어쓰기
fn build_config(cli: &Cli) -> Result<AgentConfig> {
    let mut config = AgentConfig::default();

    if let Some(value) = cli.accept_threshold {
        config.accept_threshold = value;
    }
    if let Some(value) = cli.caution_threshold {
        config.caution_threshold = value;
    }
    if let Some(value) = cli.fuzzy_cutoff {
        config.fuzzy_cutoff = value;
    }

    config.validate().context("잘못된 임계값 설정")?;
    Ok(config)
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 질문 명령어 (ask)
async fn cmd_ask(agent: &SupportAgent, question: &str, json: bool) -> Result<()> {
    let reply = agent.respond(question);

    if json {
        let output = serde_json::to_string_pretty(&reply).context("응답 직렬화 실패")?;
        println!("{}", output);
    } else {
        println!("{}", render_markdown(&reply.text));
    }

    Ok(())
}

/// 채팅 명령어 (chat)
///
/// 빈 줄은 무시하고, `/quit` 또는 `exit`로 종료합니다.
async fn cmd_chat(agent: &SupportAgent, save: bool) -> Result<()> {
    let mut session = ChatSession::new();

    println!("Thoughtful AI Support Agent");
    println!("Ask me about EVA, CAM, PHIL or our automation agents.");
    println!("(/clear, /history, /topics, /quit)");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush().context("stdout flush 실패")?;

        let Some(line) = lines.next_line().await.context("입력 읽기 실패")? else {
            println!();
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "exit" | "quit" => break,
            "/clear" => {
                session.clear();
                println!("[OK] 대화 기록을 지웠습니다.\n");
                continue;
            }
            "/history" => {
                print_history(&session);
                continue;
            }
            "/topics" => {
                println!("{}\n", render_markdown(fallback()));
                continue;
            }
            _ => {}
        }

        session.push_user(input);
        let reply = agent.respond(input);
        tracing::debug!("Reply source: {:?}", reply.source);

        println!("\n{}\n", render_markdown(&reply.text));
        session.push_assistant(reply.text);
    }

    if save && !session.is_empty() {
        let dir = get_data_dir().join("transcripts");
        let path = session.save_transcript(&dir)?;
        println!("[OK] 트랜스크립트 저장: {}", path.display());
    }

    println!("Goodbye!");
    Ok(())
}

/// 점검 명령어 (inspect)
///
/// 항목별 퍼지 유사도와 키워드 점수, 최종 결정을 출력합니다.
async fn cmd_inspect(agent: &SupportAgent, question: &str) -> Result<()> {
    let matcher = agent.matcher();
    let breakdown = matcher.breakdown(question);

    println!("[*] 입력: \"{}\"", question);
    println!("[*] 정규화: \"{}\"", breakdown.normalized);
    println!();
    println!("  #   fuzzy   keyword  question");

    let kb = matcher.knowledge_base();
    for (index, entry) in kb.entries().iter().enumerate() {
        let fuzzy = breakdown.fuzzy.get(index).copied().unwrap_or(0.0);
        let keyword = breakdown.keyword.get(index).copied().unwrap_or(0);
        let marker = if fuzzy >= matcher.cutoff() { "*" } else { " " };

        println!(
            "  {:<3} {:.4}{} {:>7}  {}",
            index,
            fuzzy,
            marker,
            keyword,
            truncate_text(&entry.question, 50)
        );
    }

    println!();

    let result = agent.find_best_match(question);
    match result.entry {
        Some(entry) => println!(
            "[OK] 최적 매칭: #{} ({:?}, 신뢰도 {:.1}%)",
            entry,
            result.method,
            result.confidence * 100.0
        ),
        None => println!("[!] 지식베이스 매칭 없음"),
    }

    let reply = agent.respond(question);
    let decision = match reply.source {
        ReplySource::Knowledge {
            low_confidence: true,
            ..
        } => "지식베이스 답변 (낮은 신뢰도 안내 포함)",
        ReplySource::Knowledge { .. } => "지식베이스 답변",
        ReplySource::Conversational => "대화 응답",
        ReplySource::Fallback => "폴백 도움말",
        ReplySource::Error => "오류 응답",
    };
    println!("[*] 결정: {}", decision);

    Ok(())
}

/// 주제 명령어 (topics)
async fn cmd_topics() -> Result<()> {
    println!("{}", render_markdown(fallback()));
    Ok(())
}

/// 상태 명령어 (status)
///
/// 지식 출처와 설정을 확인합니다.
async fn cmd_status(source: &KnowledgeSource, config: AgentConfig) -> Result<()> {
    println!("thoughtful-agent v{}", env!("CARGO_PKG_VERSION"));
    println!();

    // 데이터 디렉토리
    let data_dir = get_data_dir();
    println!("[*] 데이터 디렉토리: {}", data_dir.display());
    println!("[*] 지식 출처: {}", source);

    // 지식베이스
    match SupportAgent::load(source, config) {
        Ok(agent) => {
            let matcher = agent.matcher();
            let kb = matcher.knowledge_base();
            println!("[OK] Q&A 항목: {} 건", kb.len());

            let acronyms: Vec<_> = kb
                .acronyms()
                .iter()
                .map(|a| a.acronym.to_uppercase())
                .collect();
            println!("[OK] 약어: {} 개 ({})", acronyms.len(), acronyms.join(", "));
            println!("[OK] 키워드 규칙: {} 개", matcher.rules().len());
            println!("[OK] 대화 규칙: {} 개", agent.responder().len());
        }
        Err(e) => {
            println!("[!] 지식베이스 로드 실패: {:#}", e);
        }
    }

    // 임계값
    println!();
    println!("[*] 채택 임계값: > {}", config.accept_threshold);
    println!("[*] 안내 임계값: < {}", config.caution_threshold);
    println!("[*] 퍼지 컷오프: >= {}", config.fuzzy_cutoff);

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 대화 기록 출력
fn print_history(session: &ChatSession) {
    if session.is_empty() {
        println!("[!] 대화 기록이 없습니다.\n");
        return;
    }

    println!("[OK] 대화 기록 ({} 건):\n", session.len());
    for message in session.messages() {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "agent",
        };
        println!(
            "  {} [{}] {}",
            message.created_at.format("%H:%M:%S"),
            who,
            truncate_text(&render_markdown(&message.content), 80)
        );
    }
    println!();
}

/// Markdown 강조 제거 (`**x**`, `*x*`)
fn render_markdown(text: &str) -> Cow<'_, str> {
    let re = match Regex::new(r"\*\*([^*\n]+)\*\*|\*([^*\n]+)\*") {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("Markdown pattern failed to compile: {}", e);
            return Cow::Borrowed(text);
        }
    };

    re.replace_all(text, |caps: &regex::Captures| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    })
}

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

// ============================================================================
// Tests
// ============================================================================
