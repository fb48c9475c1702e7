use aws_sdk_sqs::error::SdkError;
use aws_sdk_sqs::operation::get_queue_url::GetQueueUrlError;
use omniqueue::QueueError as OmniQueueError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Failed to get queue url: {0}")]
    GetQueueUrlError(#[from] SdkError<GetQueueUrlError>),

    #[error("Queue backend error: {0}")]
    ErrorFromQueueError(#[from] OmniQueueError),

    #[error("Failed to get queue url for queue name : {0}")]
    FailedToGetQueueUrl(String),
}
