//! Entity structs for all Chronicle artefacts.
//!
//! Every struct derives `Serialize`, `Deserialize`, and `JsonSchema` so the
//! artefacts can be round-tripped and validated by `chron-schema`. Field names
//! are camelCase on the wire.

mod cache;
mod episode;
mod judgement;
mod series;
mod umbrella;

pub use cache::{CACHE_VERSION, CacheEntry, CacheVersion, LegacyEntry};
pub use episode::{EnrichedEpisode, Episode};
pub use judgement::SeriesJudgement;
pub use series::{Collection, Series};
pub use umbrella::{Umbrella, UmbrellaOverride, YearBounds};
