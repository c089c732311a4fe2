//! Shared building blocks for the Chatline server and client.
//!
//! Both sides speak the same newline-delimited wire protocol and run the same
//! duplex session pattern: a reader role decoding frames from the network and
//! a writer role pushing frames out.

pub mod codec;
pub mod logger;
pub mod protocol;
pub mod session;
