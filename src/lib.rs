pub mod border;
pub mod capture;
pub mod config;
pub mod container;
pub mod decision;
pub mod decode;
pub mod error;
pub mod lexicon;
pub mod report;
pub mod server;
pub mod signals;
pub mod types;

pub use error::ClassifyError;
pub use report::{classify_bytes, classify_file};
pub use types::{
    FeatureVector, GpsCoordinates, ImageFormat, ImageRecord, MetaValue, SignalSet, Verdict,
};
