//! Test helpers that drive the analysis crates the way a language frontend
//! would, without needing a parser.

mod fixture;

pub use fixture::UnitFixture;
