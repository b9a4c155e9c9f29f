pub mod completions;
pub mod launch;

pub use completions::CompletionsCommand;
pub use launch::LaunchArgs;
