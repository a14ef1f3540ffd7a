//! LLM-backed implementations of the research services.
//!
//! Each role is a small [`Agent`] with a fixed system prompt and model
//! settings, talking to a pluggable [`LlmProvider`]:
//!
//! ```text
//! PlannerAgent  ── PlanningService  (JSON search plan)
//! SearchAgent   ── SearchService    (text summary per search)
//! WriterAgent   ── WritingService   (JSON ReportData)
//! EmailAgent    ── EmailService     (JSON subject/html → SendGrid)
//! ClarifierAgent                    (stand-alone, used by `clarify`)
//! ```
//!
//! [`client::research_services`] wires them into a
//! [`ResearchServices`](crate::research::ResearchServices).

pub mod clarifier;
pub mod client;
pub mod config;
pub mod email;
pub mod message;
pub mod planner;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod searcher;
pub mod traits;
pub mod writer;

pub use clarifier::{Clarification, ClarifierAgent};
pub use client::{create_provider, research_services};
pub use config::{AgentConfig, EmailConfig};
pub use email::EmailAgent;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use planner::PlannerAgent;
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use searcher::SearchAgent;
pub use traits::{Agent, AgentResponse};
pub use writer::WriterAgent;
