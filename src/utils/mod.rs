pub mod instrument;
pub mod logging;
pub mod metrics;
