//! Message handling - parsing and routing inbound updates

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{Dispatched, MessageDispatcher};
pub use parser::MessageParser;
