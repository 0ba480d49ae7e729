pub mod date_range;
pub mod remote;
pub mod viewer_model;

pub use date_range::Clock;
pub use remote::RemoteViewerModel;
pub use viewer_model::{ModelError, TimeserieQuery, VideoCatalog, VideoViewerModel};
