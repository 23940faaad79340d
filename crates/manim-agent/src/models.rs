//! These models represent the objects passed around by the agent
//!
//! There are a few related formats we need to interact with:
//! - openai compatible chat completion messages/tools, sent from the agent to the gateway
//! - anthropic messages/tools, sent from the agent to the gateway
//! - tool calls, sent from the agent to the tool set of the active convention
//!
//! We always immediately convert those data models into the internal structs using to/from
//! helpers, so the internal models are not an exact match to any of these formats.
pub mod content;
pub mod message;
pub mod role;
pub mod tool;
