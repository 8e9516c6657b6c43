pub mod cache;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod resolver;
pub mod similarity;
pub mod store;


pub use cache::CacheWriter;
pub use error::StoreError;
pub use matcher::{Match, MatchKind, Matcher};
pub use normalize::normalize;
pub use resolver::{Resolution, Resolver};
pub use store::{KnowledgeBase, KnowledgeStore};
