// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed client for the AquaLink REST backend.
//!
//! Every response body is parsed into a concrete type at this boundary; a body
//! that does not fit becomes [`ApiError::Malformed`] instead of leaking further.

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::io::Read;
use std::time::Duration;
use tracing::debug;

use crate::error::{ApiError, ApiResult, ValidationError};
use crate::models::{
    Feedback, FinanceOverview, InventoryItem, Payment, SalaryPayload, SalaryRecord,
    TankAssignment, Transaction, TransactionDraft,
};
use crate::session::{Role, Session};
use crate::utils::http_client;

/// Everything the finance core needs from the backend. [`ApiClient`] is the real
/// implementation.
pub trait FinanceBackend {
    fn overview(&self) -> ApiResult<FinanceOverview>;
    fn transactions(&self) -> ApiResult<Vec<Transaction>>;
    fn create_transaction(&self, draft: &TransactionDraft) -> ApiResult<Transaction>;
    fn update_transaction(&self, id: &str, draft: &TransactionDraft) -> ApiResult<Transaction>;
    fn delete_transaction(&self, id: &str) -> ApiResult<()>;
    fn payments(&self) -> ApiResult<Vec<Payment>>;
    fn salaries(&self) -> ApiResult<Vec<SalaryRecord>>;
    fn create_salary(&self, record: &SalaryRecord) -> ApiResult<SalaryRecord>;
    fn delete_salary(&self, id: &str) -> ApiResult<()>;
    fn inventory(&self) -> ApiResult<Vec<InventoryItem>>;
    fn inventory_item(&self, id: &str) -> ApiResult<InventoryItem>;
    fn set_stock(&self, id: &str, stock: i64) -> ApiResult<InventoryItem>;
    fn assignments(&self) -> ApiResult<Vec<TankAssignment>>;
    fn submit_feedback(&self, feedback: &Feedback) -> ApiResult<()>;
    /// The raw `text/event-stream` body of the finance change channel.
    fn subscribe(&self) -> ApiResult<Box<dyn Read>>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Session,
}

#[derive(Deserialize)]
struct Wrapped<T> {
    data: T,
}

/// Accepts a bare body or one wrapped as `{"data": ...}`.
pub fn parse_body<T: DeserializeOwned>(endpoint: &str, body: &str) -> ApiResult<T> {
    match serde_json::from_str::<T>(body) {
        Ok(v) => Ok(v),
        Err(bare_err) => serde_json::from_str::<Wrapped<T>>(body)
            .map(|w| w.data)
            .map_err(|_| ApiError::Malformed {
                endpoint: endpoint.to_string(),
                source: bare_err,
            }),
    }
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session, timeout: Duration) -> ApiResult<Self> {
        Ok(ApiClient {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Role header on every request, bearer token when we have one.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req.header("x-role", self.session.role.as_str());
        match &self.session.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    fn require_role(&self, role: Role) -> ApiResult<()> {
        if self.session.role != role {
            return Err(ValidationError::RoleRequired(role).into());
        }
        Ok(())
    }

    fn check(path: &str, resp: Response) -> ApiResult<Response> {
        let status = resp.status();
        debug!(path, status = status.as_u16(), "response");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(body),
            StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
            s => ApiError::Status {
                status: s.as_u16(),
                body,
            },
        })
    }

    fn send<T: DeserializeOwned>(&self, path: &str, req: RequestBuilder) -> ApiResult<T> {
        let resp = self.authorize(req).send()?;
        let body = Self::check(path, resp)?.text()?;
        parse_body(path, &body)
    }

    fn send_empty(&self, path: &str, req: RequestBuilder) -> ApiResult<()> {
        let resp = self.authorize(req).send()?;
        Self::check(path, resp)?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        debug!(path, "GET");
        self.send(path, self.client.get(self.url(path)))
    }

    /// Opens `GET /api/finance/events`. The returned body streams for as long as
    /// the server keeps it open, so the per-request timeout is lifted.
    pub fn open_event_stream(&self) -> ApiResult<Response> {
        let path = "/api/finance/events";
        debug!(path, "subscribe");
        let stream_client = http_client(None::<Duration>)?;
        let req = stream_client
            .get(self.url(path))
            .header(reqwest::header::ACCEPT, "text/event-stream");
        let resp = self.authorize(req).send()?;
        Self::check(path, resp)
    }
}

impl FinanceBackend for ApiClient {
    fn overview(&self) -> ApiResult<FinanceOverview> {
        self.get("/api/finance/overview")
    }

    fn transactions(&self) -> ApiResult<Vec<Transaction>> {
        self.get("/api/transactions")
    }

    fn create_transaction(&self, draft: &TransactionDraft) -> ApiResult<Transaction> {
        let path = "/api/transactions";
        debug!(path, name = %draft.name, kind = %draft.tx_type, "POST");
        self.send(path, self.client.post(self.url(path)).json(draft))
    }

    fn update_transaction(&self, id: &str, draft: &TransactionDraft) -> ApiResult<Transaction> {
        let path = format!("/api/transactions/{}", id);
        debug!(path = %path, "PATCH");
        self.send(&path, self.client.patch(self.url(&path)).json(draft))
    }

    fn delete_transaction(&self, id: &str) -> ApiResult<()> {
        let path = format!("/api/transactions/{}", id);
        debug!(path = %path, "DELETE");
        self.send_empty(&path, self.client.delete(self.url(&path)))
    }

    fn payments(&self) -> ApiResult<Vec<Payment>> {
        self.get("/api/buyer/payments")
    }

    fn salaries(&self) -> ApiResult<Vec<SalaryRecord>> {
        self.get("/api/salaries")
    }

    fn create_salary(&self, record: &SalaryRecord) -> ApiResult<SalaryRecord> {
        self.require_role(Role::Owner)?;
        let path = "/api/salaries";
        debug!(path, staff = %record.staff_id, "POST");
        let body = SalaryPayload::new(record);
        self.send(path, self.client.post(self.url(path)).json(&body))
    }

    fn delete_salary(&self, id: &str) -> ApiResult<()> {
        self.require_role(Role::Owner)?;
        let path = format!("/api/salaries/{}", id);
        debug!(path = %path, "DELETE");
        self.send_empty(&path, self.client.delete(self.url(&path)))
    }

    fn inventory(&self) -> ApiResult<Vec<InventoryItem>> {
        self.get("/api/fishinventory")
    }

    fn inventory_item(&self, id: &str) -> ApiResult<InventoryItem> {
        self.get(&format!("/api/fishinventory/{}", id))
    }

    fn set_stock(&self, id: &str, stock: i64) -> ApiResult<InventoryItem> {
        let path = format!("/api/fishinventory/{}", id);
        debug!(path = %path, stock, "PATCH");
        let body = json!({ "stock": stock });
        self.send(&path, self.client.patch(self.url(&path)).json(&body))
    }

    fn assignments(&self) -> ApiResult<Vec<TankAssignment>> {
        self.get("/api/fishinventory/assigned")
    }

    fn submit_feedback(&self, feedback: &Feedback) -> ApiResult<()> {
        let path = "/api/feedback";
        debug!(path, "POST");
        self.send_empty(path, self.client.post(self.url(path)).json(feedback))
    }

    fn subscribe(&self) -> ApiResult<Box<dyn Read>> {
        Ok(Box::new(self.open_event_stream()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_body_accepts_data_envelope() {
        let v: Vec<i64> = parse_body("/x", r#"{"data":[1,2,3]}"#).unwrap();
        assert_eq!(v, vec![1, 2, 3]);
        let v: Vec<i64> = parse_body("/x", "[4]").unwrap();
        assert_eq!(v, vec![4]);
    }

    #[test]
    fn parse_body_reports_endpoint_on_mismatch() {
        let err = parse_body::<Vec<i64>>("/api/transactions", r#"{"rows":1}"#).unwrap_err();
        match err {
            ApiError::Malformed { endpoint, .. } => assert_eq!(endpoint, "/api/transactions"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
