pub mod chooser;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod notification;
pub mod source;

pub use chooser::{Chooser, NoChoice, PromptChooser};
pub use error::ResolveError;
pub use extractor::{Extractor, ExtractorRegistry};
pub use fetcher::{FetchOptions, Fetcher, HttpFetcher};
pub use notification::{notifier_for, NotificationMethod, Notifier, NullNotifier};
pub use source::{RawLink, Source, SourceList};
