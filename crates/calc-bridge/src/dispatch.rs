//! Remote calls and response validation
//!
//! Every call is one synchronous round trip. A response is accepted in three
//! steps: a response arrived at all, it is JSON, and its status is 200. A
//! non-200 JSON body is read as the `{error}` envelope and its message is
//! surfaced verbatim.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use calc_bridge_core::CellValue;
use calc_bridge_protocol::{
    BatchCalcRequest, CalcRequest, CalcResponse, CalcResult, ErrorResponse, EvalSheetResponse,
    HealthResponse, OperationsResponse, SumifsRequest, WireValue,
};

use crate::classify;
use crate::codec::SheetBatch;
use crate::config::{BridgeConfig, Endpoint};
use crate::error::{BridgeError, Result};
use crate::transport::{HttpReply, HttpTransport, Transport};

/// Sends requests to the configured services
#[derive(Debug, Clone)]
pub struct Dispatcher<T: Transport = HttpTransport> {
    config: BridgeConfig,
    transport: T,
}

impl Dispatcher<HttpTransport> {
    /// Create a dispatcher over the blocking HTTP client
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self { config, transport })
    }
}

impl<T: Transport> Dispatcher<T> {
    /// Create a dispatcher over any transport
    pub fn with_transport(config: BridgeConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `POST {calc}/calc` with flattened arguments
    ///
    /// The operation and arguments are checked locally first; a sentinel in
    /// any argument fails without a network call.
    pub fn calc(&self, operation: &CellValue, args: &[CellValue]) -> Result<CalcResult> {
        let operation = classify::check_operation(operation)?;
        classify::check_args(args)?;

        let request = CalcRequest {
            operation: operation.to_string(),
            args: args.iter().map(WireValue::from).collect(),
        };
        let response: CalcResponse = self.post(Endpoint::Calc, "calc", &request)?;
        Ok(normalize_result(response.result))
    }

    /// `POST {calc}/calc` with a validated sumifs payload
    pub fn sumifs(&self, request: &SumifsRequest) -> Result<CalcResult> {
        let response: CalcResponse = self.post(Endpoint::Calc, "calc", request)?;
        Ok(normalize_result(response.result))
    }

    /// `POST {batch}/eval_sheet` with a whole sheet
    pub fn eval_sheet(&self, batch: &SheetBatch) -> Result<EvalSheetResponse> {
        let request = batch.to_request()?;
        let (rows, cols) = batch.dimensions();
        info!(rows, cols, formulas = batch.formula_count(), "evaluating sheet");
        self.post(Endpoint::Batch, "eval_sheet", &request)
    }

    /// `POST {batch}/batch_calc` for one cell
    pub fn batch_calc(&self, request: &BatchCalcRequest) -> Result<CalcResult> {
        if request.operation.trim().is_empty() {
            return Err(BridgeError::input("operation must be a non-empty string"));
        }
        let response: CalcResponse = self.post(Endpoint::Batch, "batch_calc", request)?;
        Ok(normalize_result(response.result))
    }

    /// `GET {base}/operations`
    pub fn operations(&self, endpoint: Endpoint) -> Result<Vec<String>> {
        let response: OperationsResponse = self.get(endpoint, "operations")?;
        Ok(response.operations)
    }

    /// `GET {base}/health`
    pub fn health(&self, endpoint: Endpoint) -> Result<HealthResponse> {
        self.get(endpoint, "health")
    }

    fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        route: &str,
        request: &Req,
    ) -> Result<Resp> {
        let url = self.config.url(endpoint, route);
        let body = serde_json::to_value(request).map_err(|e| BridgeError::Parse(e.to_string()))?;
        debug!(%url, "POST");
        let reply = self.transport.post_json(&url, &body).map_err(|e| {
            warn!(%url, error = %e, "request failed");
            e
        })?;
        decode(reply)
    }

    fn get<Resp: DeserializeOwned>(&self, endpoint: Endpoint, route: &str) -> Result<Resp> {
        let url = self.config.url(endpoint, route);
        debug!(%url, "GET");
        decode(self.transport.get(&url)?)
    }
}

/// Interpret a raw reply as a success body or an error envelope
pub fn decode<Resp: DeserializeOwned>(reply: HttpReply) -> Result<Resp> {
    if !reply.is_json() {
        return Err(BridgeError::NotJson {
            status: reply.status,
        });
    }

    if reply.status != 200 {
        let envelope: ErrorResponse =
            serde_json::from_str(&reply.body).unwrap_or(ErrorResponse { error: None });
        let message = envelope
            .error
            .unwrap_or_else(|| format!("unknown error (HTTP {})", reply.status));
        debug!(status = reply.status, %message, "server error");
        return Err(BridgeError::Server {
            status: reply.status,
            message,
        });
    }

    serde_json::from_str(&reply.body).map_err(|e| BridgeError::Parse(e.to_string()))
}

/// A null or absent result reads as empty text
fn normalize_result(result: Option<CalcResult>) -> CalcResult {
    result.unwrap_or_else(|| CalcResult::Scalar(WireValue::String(String::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_success() {
        let resp: CalcResponse = decode(HttpReply::json(200, r#"{"result": 5}"#)).unwrap();
        assert_eq!(resp.result, Some(CalcResult::Scalar(WireValue::Integer(5))));
    }

    #[test]
    fn test_decode_not_json() {
        let reply = HttpReply {
            status: 502,
            content_type: Some("text/html".into()),
            body: "<html>Bad gateway</html>".into(),
        };
        let err = decode::<CalcResponse>(reply).unwrap_err();
        assert!(matches!(err, BridgeError::NotJson { status: 502 }));
        assert_eq!(err.to_string(), "server did not return JSON (HTTP 502)");
    }

    #[test]
    fn test_decode_error_envelope() {
        let err = decode::<CalcResponse>(HttpReply::json(400, r#"{"error": "unknown operation: pls"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown operation: pls");

        let err = decode::<CalcResponse>(HttpReply::json(500, "{}")).unwrap_err();
        assert_eq!(err.to_string(), "unknown error (HTTP 500)");

        let err = decode::<CalcResponse>(HttpReply::json(503, "not json at all")).unwrap_err();
        assert!(matches!(err, BridgeError::Server { status: 503, .. }));
    }

    #[test]
    fn test_decode_bad_shape() {
        let err = decode::<OperationsResponse>(HttpReply::json(200, r#"{"operations": 3}"#)).unwrap_err();
        assert!(matches!(err, BridgeError::Parse(_)));
    }

    #[test]
    fn test_null_result_is_empty_text() {
        assert_eq!(
            normalize_result(None),
            CalcResult::Scalar(WireValue::String(String::new()))
        );
    }
}
