pub mod file_stitcher;
pub mod stitch_report;

pub use file_stitcher::{AppendedFragment, FileStitcher, StitchProgress};
pub use stitch_report::{FragmentInfo, StitchReport};
