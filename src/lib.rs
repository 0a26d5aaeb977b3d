//! LINE relay - webhook gateway between LINE chats and a generative AI API
//!
//! Receives LINE webhook deliveries, answers text and image messages with
//! generated replies, stores uploaded images and logs each exchange.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              LINE Messaging Platform                 │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST /webhook (signed)
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Relay                             │
//! │   Signature  │  Dispatch  │  Image path  │  Text path│
//! └──────┬───────────────┬──────────────────┬───────────┘
//!        │               │                  │
//!  ┌─────▼─────┐  ┌──────▼──────┐   ┌───────▼────────┐
//!  │ LINE API  │  │ Completion  │   │ Storage + Log  │
//!  └───────────┘  └─────────────┘   └────────────────┘
//! ```

pub mod api;
pub mod channels;
pub mod config;
pub mod error;
pub mod inference;
pub mod relay;
pub mod store;

pub use channels::{Content, LineClient, Messenger, OutgoingMessage};
pub use config::{Config, Scenario, Templates};
pub use error::{Error, Result};
pub use inference::{Completion, CompletionRequest, InlineMedia, OpenAiClient};
pub use relay::{EventOutcome, Relay};
pub use store::{MessageRecord, RecordPolicy, Store, SupabaseStore};
