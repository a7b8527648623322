pub mod api;
pub mod assign;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod debounce;
pub mod draft;
pub mod entity;
pub mod error;
pub mod payload;
pub mod search;
pub mod storage;
pub mod wizard;

pub use api::{ApiClient, ApiError, Backend};
pub use cache::ResourceCache;
pub use context::AppContext;
pub use draft::{AgentDraft, DraftStore};
pub use error::{DeskError, Result};
pub use wizard::{Mode, WizardController};
