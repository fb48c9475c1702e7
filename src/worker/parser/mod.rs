pub mod scan_request_message;

pub use scan_request_message::ScanRequest;
