// src/submission.rs

//! # Envio de solicitações
//!
//! Enquanto não existe uma API real, [`SimulatedGateway`] responde depois de
//! um atraso aleatório e falha com uma probabilidade configurável. Uma API
//! real tem de manter as duas formas de resposta: `{ok:true,id}` ou
//! `{ok:false,error}`.

use crate::selection::{FormSnapshot, MasterOption};
use chrono::NaiveDate;
use futures_util::future::BoxFuture;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dados enviados para a API: o formulário completo mais a justificativa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obra: Option<MasterOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<NaiveDate>>,
    pub employees: Vec<MasterOption>,
    pub notes: String,
}

impl SubmissionPayload {
    pub fn new(snapshot: FormSnapshot, notes: &str) -> Self {
        Self {
            obra: snapshot.obra,
            hours: snapshot.hours,
            date: snapshot.date,
            employees: snapshot.employees,
            notes: notes.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitOutcome {
    Created { ok: Accepted, id: u32 },
    Failed { ok: Rejected, error: String },
}

/// `true` literal no JSON de sucesso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "bool", into = "bool")]
pub struct Accepted;

/// `false` literal no JSON de falha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "bool", into = "bool")]
pub struct Rejected;

impl From<Accepted> for bool {
    fn from(_: Accepted) -> bool {
        true
    }
}

impl TryFrom<bool> for Accepted {
    type Error = &'static str;
    fn try_from(v: bool) -> Result<Self, Self::Error> {
        v.then_some(Accepted).ok_or("esperado ok=true")
    }
}

impl From<Rejected> for bool {
    fn from(_: Rejected) -> bool {
        false
    }
}

impl TryFrom<bool> for Rejected {
    type Error = &'static str;
    fn try_from(v: bool) -> Result<Self, Self::Error> {
        (!v).then_some(Rejected).ok_or("esperado ok=false")
    }
}

impl SubmitOutcome {
    pub fn created(id: u32) -> Self {
        SubmitOutcome::Created { ok: Accepted, id }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        SubmitOutcome::Failed { ok: Rejected, error: error.into() }
    }
}

/// Destino das solicitações.
pub trait SubmissionGateway: Send + Sync {
    fn submit<'a>(&'a self, payload: &'a SubmissionPayload) -> BoxFuture<'a, SubmitOutcome>;
}

#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    pub failure_rate: f64,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self {
            failure_rate: 0.08,
            min_delay: Duration::from_millis(900),
            max_delay: Duration::from_millis(1500),
        }
    }
}

impl SimulatedGateway {
    fn roll(&self) -> (Duration, SubmitOutcome) {
        let mut rng = rand::thread_rng();
        let min = self.min_delay.as_millis() as u64;
        let max = (self.max_delay.as_millis() as u64).max(min);
        let delay = Duration::from_millis(rng.gen_range(min..=max));
        let rate = if self.failure_rate.is_finite() { self.failure_rate.clamp(0.0, 1.0) } else { 0.0 };
        let outcome = if rng.gen_bool(rate) {
            SubmitOutcome::failed("Erro interno do servidor (simulado)")
        } else {
            SubmitOutcome::created(rng.gen_range(1000..91000))
        };
        (delay, outcome)
    }
}

impl SubmissionGateway for SimulatedGateway {
    fn submit<'a>(&'a self, payload: &'a SubmissionPayload) -> BoxFuture<'a, SubmitOutcome> {
        Box::pin(async move {
            let (delay, outcome) = self.roll();
            tracing::debug!(
                delay_ms = delay.as_millis() as u64,
                employees = payload.employees.len(),
                "POST /api/solicitacoes (simulado)"
            );
            tokio::time::sleep(delay).await;
            outcome
        })
    }
}
