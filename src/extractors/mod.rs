pub mod common;
pub mod divxden;
pub mod looping;
pub mod movshare;
pub mod packer;
pub mod tvdex;
pub mod tweety;
pub mod youtube;
pub mod zshare;

pub use divxden::DivxdenExtractor;
pub use looping::LoopingExtractor;
pub use movshare::MovshareExtractor;
pub use tvdex::TvdexExtractor;
pub use tweety::TweetyExtractor;
pub use youtube::YouTubeExtractor;
pub use zshare::ZshareExtractor;
