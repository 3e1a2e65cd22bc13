//! Conversions from external infrastructure errors into domain errors.

use inkflow_domain::InkFlowError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub InkFlowError);

impl From<InfraError> for InkFlowError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<InkFlowError> for InfraError {
    fn from(value: InkFlowError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoInkFlowError {
    fn into_inkflow(self) -> InkFlowError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → InkFlowError */
/* -------------------------------------------------------------------------- */

impl IntoInkFlowError for HttpError {
    fn into_inkflow(self) -> InkFlowError {
        if self.is_timeout() {
            return InkFlowError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return InkFlowError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => InkFlowError::Auth(message),
                404 => InkFlowError::NotFound(message),
                429 => InkFlowError::Network(message),
                400..=499 => InkFlowError::InvalidInput(message),
                500..=599 => InkFlowError::Network(message),
                _ => InkFlowError::Network(message),
            };
        }

        InkFlowError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_inkflow())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use tokio::runtime::Runtime;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn status_error(status: StatusCode) -> HttpError {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err()
    }

    #[test]
    fn http_status_401_maps_to_auth_error() {
        Runtime::new().unwrap().block_on(async {
            let error = status_error(StatusCode::UNAUTHORIZED).await;

            let mapped: InkFlowError = InfraError::from(error).into();
            match mapped {
                InkFlowError::Auth(msg) => assert!(msg.contains("401")),
                other => panic!("expected auth error, got {:?}", other),
            }
        });
    }

    #[test]
    fn http_status_404_maps_to_not_found() {
        Runtime::new().unwrap().block_on(async {
            let error = status_error(StatusCode::NOT_FOUND).await;

            let mapped: InkFlowError = InfraError::from(error).into();
            match mapped {
                InkFlowError::NotFound(msg) => assert!(msg.contains("404")),
                other => panic!("expected not found, got {:?}", other),
            }
        });
    }

    #[test]
    fn http_status_503_maps_to_network_error() {
        Runtime::new().unwrap().block_on(async {
            let error = status_error(StatusCode::SERVICE_UNAVAILABLE).await;

            let mapped: InkFlowError = InfraError::from(error).into();
            match mapped {
                InkFlowError::Network(msg) => assert!(msg.contains("503")),
                other => panic!("expected network error, got {:?}", other),
            }
        });
    }

    #[test]
    fn connection_failure_maps_to_network_error() {
        Runtime::new().unwrap().block_on(async {
            // Bind then drop a listener so the port refuses connections.
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            let port = listener.local_addr().unwrap().port();
            drop(listener);

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(format!("http://127.0.0.1:{port}/")).send().await.unwrap_err();

            let mapped: InkFlowError = InfraError::from(error).into();
            match mapped {
                InkFlowError::Network(msg) => assert!(msg.contains("connection")),
                other => panic!("expected network error, got {:?}", other),
            }
        });
    }
}
