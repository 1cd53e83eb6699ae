//! Client-side chat session: the conversation log and the controller that
//! fills in assistant replies as they stream back from the relay.

pub mod client;
pub mod controller;
pub mod decoder;
pub mod log;
