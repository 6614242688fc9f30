mod client;
mod prompt;
mod stream;
mod types;

pub use client::*;
pub use prompt::*;
pub use stream::*;
pub use types::*;
