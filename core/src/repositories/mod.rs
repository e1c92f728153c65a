pub mod cache;

pub use cache::TtlCache;

#[cfg(test)]
pub use cache::MockTtlCache;
