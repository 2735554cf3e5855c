pub mod anthropic;
pub mod mock;
pub mod rate_limiter;

pub use anthropic::AnthropicCompleter;
pub use mock::MockCompleter;
