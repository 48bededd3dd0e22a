//! # Teamboard 共有ユーティリティ
//!
//! Teamboard の各クレートから共通で使用されるユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain, infra, core-service）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（tracing 系は feature で有効化）

pub mod api_response;
pub mod event_log;
pub mod health;
pub mod observability;

pub use api_response::ApiResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};
