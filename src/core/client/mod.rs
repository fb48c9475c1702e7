pub mod database;
pub mod queue;
pub mod scanner;

pub use database::mongodb::MongoDbClient;
pub use database::DatabaseClient;
pub use queue::sqs::SQS;
pub use queue::QueueClient;
pub use scanner::ComplianceScanClient;
