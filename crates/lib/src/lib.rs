//! Relay core library: webhook verification, event dispatch, Gemini client, Messenger
//! channel, and the HTTP gateway used by the `relay` binary.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod relay;
pub mod signature;
