pub mod consts;
pub mod errors;
pub mod utils;
pub mod normalize;
pub mod hashing;
pub mod params;
pub mod bits;
pub mod filter;
pub mod blocklist;
pub mod builder;
pub mod codec;
pub mod oracle;
pub mod stream;
pub mod config;

pub use bits::BitArray;
pub use blocklist::{load_blocklist, parse_blocklist, read_blocklist, select, BlocklistEntry};
pub use builder::{build_filter, BuildReport, EmptyPolicy, FilterBuilder};
pub use codec::{decode, decode_legacy, encode, encode_legacy, read_artifact, write_artifact, ArtifactFormat};
pub use config::BuildConfig;
pub use errors::{Result, WordBloomError};
pub use filter::BloomFilter;
pub use hashing::{probe, probes, HashScheme};
pub use normalize::Normalization;
pub use oracle::MembershipOracle;
pub use params::{optimal_num_hashes, theoretical_fpr, FilterParams};
pub use stream::{LoadFailurePolicy, StatsSnapshot, StreamFilter};
