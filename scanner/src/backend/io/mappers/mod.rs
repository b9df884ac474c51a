pub mod scan_result_mapper;

pub use scan_result_mapper::ScanResultMapper;
