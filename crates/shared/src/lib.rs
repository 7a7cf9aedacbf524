pub mod events;
pub mod message;
pub mod registry;
pub mod schemas;
pub mod toolbelts;

pub use message::{FunctionCall, Message, Role, ToolCall};
pub use registry::{ToolRequest, Toolbox};
pub use schemas::{ParameterSchema, Tool, ToolSchema};
