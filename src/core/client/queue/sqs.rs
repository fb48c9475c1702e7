use crate::core::client::queue::{QueueClient, QueueError};
use crate::types::params::QueueArgs;
use crate::types::queue::QueueType;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::Client;
use omniqueue::backends::{SqsBackend, SqsConfig, SqsConsumer, SqsProducer};
use omniqueue::Delivery;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct InnerSQS(Arc<Client>);

impl InnerSQS {
    pub fn new(aws_config: &SdkConfig) -> Self {
        let sqs_config_builder = aws_sdk_sqs::config::Builder::from(aws_config);
        let client = Client::from_conf(sqs_config_builder.build());
        Self(Arc::new(client))
    }

    pub fn client(&self) -> Arc<Client> {
        self.0.clone()
    }

    /// get_queue_url_from_client - Get the queue URL from the client
    /// This function returns the queue URL based on the queue name.
    pub async fn get_queue_url_from_client(&self, queue_name: &str) -> Result<String, QueueError> {
        Ok(self
            .client()
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await?
            .queue_url()
            .ok_or_else(|| QueueError::FailedToGetQueueUrl(queue_name.to_string()))?
            .to_string())
    }

    /// get_queue_name_from_type - Get the queue specific name from its type
    /// This function returns the queue name based on the queue type provided
    pub fn get_queue_name_from_type(template: &str, queue_type: &QueueType) -> String {
        template.replace("{}", &queue_type.to_string())
    }
}

/// SQS-backed implementation of [`QueueClient`].
///
/// Producers and consumers are built through omniqueue on top of the resolved
/// queue URL; URL resolution itself uses the raw SQS client.
#[derive(Clone, Debug)]
pub struct SQS {
    inner: InnerSQS,
    queue_template: String,
}

impl SQS {
    pub fn new(aws_config: &SdkConfig, args: &QueueArgs) -> Self {
        Self { inner: InnerSQS::new(aws_config), queue_template: args.queue_template.clone() }
    }

    pub fn client(&self) -> Arc<Client> {
        self.inner.client()
    }

    /// get_queue_name - Get the queue name for a queue type
    /// The configured template contains "{}" which is replaced with the queue type
    pub fn get_queue_name(&self, queue_type: &QueueType) -> String {
        InnerSQS::get_queue_name_from_type(&self.queue_template, queue_type)
    }

    /// get_producer - Get the producer for the given queue
    pub async fn get_producer(&self, queue: QueueType) -> Result<SqsProducer, QueueError> {
        let queue_name = self.get_queue_name(&queue);
        let queue_url = self.inner.get_queue_url_from_client(queue_name.as_str()).await?;
        let producer =
            SqsBackend::builder(SqsConfig { queue_dsn: queue_url, override_endpoint: false }).build_producer().await?;
        Ok(producer)
    }

    /// get_consumer - Get the consumer for the given queue
    pub async fn get_consumer(&self, queue: QueueType) -> Result<SqsConsumer, QueueError> {
        let queue_name = self.get_queue_name(&queue);
        let queue_url = self.inner.get_queue_url_from_client(queue_name.as_str()).await?;
        let consumer =
            SqsBackend::builder(SqsConfig { queue_dsn: queue_url, override_endpoint: false }).build_consumer().await?;
        Ok(consumer)
    }
}

#[async_trait]
impl QueueClient for SQS {
    /// send_message - Send a message to the queue, optionally delayed
    async fn send_message(&self, queue: QueueType, payload: String, delay: Option<Duration>) -> Result<(), QueueError> {
        let producer = self.get_producer(queue).await?;
        match delay {
            Some(d) => producer.send_raw_scheduled(payload.as_str(), d).await?,
            None => producer.send_raw(payload.as_str()).await?,
        }
        Ok(())
    }

    /// consume_message_from_queue - Receive a single delivery from the queue
    async fn consume_message_from_queue(&self, queue: QueueType) -> Result<Delivery, QueueError> {
        let mut consumer = self.get_consumer(queue).await?;
        Ok(consumer.receive().await?)
    }
}
