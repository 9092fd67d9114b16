//! Web search implementations

mod tavily;

pub use tavily::TavilyWebSearch;
