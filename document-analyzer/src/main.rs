use std::sync::Arc;

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;

use document_analyzer::Dependencies;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    let analyzer = Arc::new(Dependencies::new().await?.analyzer);
    info!("Document analyzer ready");

    run(service_fn(move |event: LambdaEvent<S3Event>| {
        let analyzer = analyzer.clone();
        async move {
            let outcomes = analyzer.handle(&event.payload).await?;
            Ok::<_, Error>(serde_json::to_value(outcomes)?)
        }
    }))
    .await
}
