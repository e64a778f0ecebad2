//! Lambda@Edge origin-request handler that signs request bodies.
//!
//! Computes SHA-256 of the request body CloudFront passes in and sets
//! `x-amz-content-sha256` so that CloudFront's SigV4 signing towards the
//! Lambda Function URL origin covers the payload.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::error;

use todo_api::config::Config;
use todo_api::edge::{handle_origin_request, CloudFrontRequest, CloudFrontRequestEvent};

async fn function_handler(
    event: LambdaEvent<CloudFrontRequestEvent>,
) -> Result<CloudFrontRequest, Error> {
    let (event, context) = event.into_parts();

    match handle_origin_request(event) {
        Ok(request) => Ok(request),
        Err(e) => {
            error!(
                error = %e,
                request_id = %context.request_id,
                "Failed to hash origin request body"
            );
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Lambda@Edge does not support environment variables; only defaults apply.
    todo_api::logging::init_tracing(&Config::default().logging);

    run(service_fn(function_handler)).await
}
