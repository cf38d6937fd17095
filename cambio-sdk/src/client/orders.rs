//! Order service client.

use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use url::Url;
use uuid::Uuid;

use super::{ClientError, http_client, parse_response};
use crate::objects::orders::{CreateOrderRequest, CreateOrderResponse, ProofUploadResponse};

/// A proof-of-payment file ready to be uploaded.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Typed HTTP client for the order service.
///
/// Requests carry `Authorization: Bearer <api_key>` when a key is
/// configured.
#[derive(Debug, Clone)]
pub struct OrderServiceClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl OrderServiceClient {
    /// Create a new `OrderServiceClient`.
    ///
    /// * `base_url` – root URL of the order service.
    /// * `api_key` – optional bearer token.
    pub fn new(base_url: Url, api_key: Option<String>) -> Self {
        Self {
            http: http_client(std::time::Duration::from_secs(30)),
            base_url,
            api_key,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// `POST /orders` – register a new pending order.
    #[tracing::instrument(skip_all, err, name = "HTTP:CreateOrder")]
    pub async fn create_order(&self, order: &CreateOrderRequest) -> Result<Uuid, ClientError> {
        let url = self.base_url.join("orders")?;
        let resp = self
            .authorize(self.http.post(url))
            .json(order)
            .send()
            .await?;
        let body: CreateOrderResponse = parse_response(resp).await?;
        Ok(body.order_id)
    }

    /// `POST /proofs` – store a proof-of-payment file, returning its URL.
    #[tracing::instrument(skip_all, err, fields(file_name = %proof.file_name), name = "HTTP:UploadProof")]
    pub async fn upload_proof(&self, proof: ProofUpload) -> Result<Url, ClientError> {
        let url = self.base_url.join("proofs")?;
        let part = Part::stream(proof.bytes)
            .file_name(proof.file_name)
            .mime_str(&proof.content_type)?;
        let form = Form::new().part("file", part);
        let resp = self
            .authorize(self.http.post(url))
            .multipart(form)
            .send()
            .await?;
        let body: ProofUploadResponse = parse_response(resp).await?;
        Ok(body.url)
    }
}
