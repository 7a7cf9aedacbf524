pub mod conversation;
pub mod graph;
pub mod model;

pub use conversation::ConversationStep;
pub use graph::{AfterTools, Graph, Node, RunOutcome};
pub use model::{ChatModel, OpenAiChat};
