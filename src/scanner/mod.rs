pub mod fragment_filter;
pub mod fragment_scanner;

pub use fragment_filter::FragmentFilter;
pub use fragment_scanner::{Fragment, FragmentScanner, ScanStatistics};
