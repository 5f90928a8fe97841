// src/selection.rs

//! # Gestor de seleção de funcionários
//!
//! Mantém uma lista de linhas, cada uma com um seletor de funcionário, e
//! garante que nenhum funcionário é escolhido em duas linhas. A lista de
//! opções mestre é fixada na construção e nunca muda.
//!
//! Sempre que uma linha muda, todas as outras são recalculadas: um valor
//! recém-escolhido desaparece das restantes e um valor libertado volta a
//! aparecer em todas.

use crate::dates;
use crate::modal::Confirm;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

pub const NONE_SELECTED_LABEL: &str = "Selecione um funcionário";
pub const ADD_DISABLED_TITLE: &str =
    "Não é possível adicionar mais — todos os funcionários já foram adicionados.";
pub const REMOVE_CONFIRM_MESSAGE: &str = "Tem certeza que deseja excluir este funcionário?";

/// Uma opção `{ value, text }` de um seletor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterOption {
    pub value: String,
    pub text: String,
}

impl MasterOption {
    pub fn new(value: &str, text: &str) -> Self {
        Self { value: value.to_string(), text: text.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(pub u32);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "select_{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRow {
    id: RowId,
    value: Option<String>,
    candidates: Vec<MasterOption>,
}

impl SelectionRow {
    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Opções que esta linha pode mostrar (sem o marcador "nenhum").
    pub fn candidates(&self) -> &[MasterOption] {
        &self.candidates
    }

    fn selected_option(&self) -> Option<&MasterOption> {
        let value = self.value.as_deref()?;
        self.candidates.iter().find(|o| o.value == value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("todos os funcionários já foram adicionados")]
    LimitReached,
    #[error("linha {0} não encontrada")]
    UnknownRow(RowId),
    #[error("o funcionário '{0}' não está disponível nesta linha")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Declined,
}

/// Campos do formulário que acompanham os seletores. `None` indica que o
/// campo não existe na página; `Some("")` indica um campo vazio.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pub site: Option<SiteField>,
    pub hours: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SiteField {
    pub options: Vec<MasterOption>,
    pub selected: String,
}

/// Leitura completa do formulário. Campos ausentes da página não são
/// serializados; campos presentes mas vazios aparecem como `null`/vazio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obra: Option<MasterOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<NaiveDate>>,
    pub employees: Vec<MasterOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormIssue {
    #[error("Selecione a obra.")]
    MissingSite,
    #[error("Informe a data.")]
    MissingDate,
    #[error("A data informada deve ser com pelo menos 03 dias de antecedência.")]
    DateTooSoon,
    #[error("Informe a quantidade de horas (maior que 0).")]
    InvalidHours,
    #[error("Adicione ao menos um funcionário.")]
    NoEmployees,
    #[error("Preencha a justificativa.")]
    MissingNotes,
}

impl Serialize for FormIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormValidation {
    pub valid: bool,
    pub errors: Vec<FormIssue>,
}

/// Horas informadas: número (fração permitida), nunca negativo; vazio ou
/// inválido vale 0.
pub fn parse_hours(raw: &str) -> f64 {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite())
        .map_or(0.0, |h| h.max(0.0))
}

pub struct SelectionManager {
    master: Vec<MasterOption>,
    counter: u32,
    rows: Vec<SelectionRow>,
    payload_json: String,
}

impl SelectionManager {
    /// Cria o gestor com a lista de funcionários e uma primeira linha vazia.
    /// Opções com valor vazio (marcadores) são ignoradas.
    pub fn new(master: Vec<MasterOption>) -> Self {
        let master = master.into_iter().filter(|o| !o.value.is_empty()).collect();
        let mut manager = Self { master, counter: 0, rows: Vec::new(), payload_json: "[]".to_string() };
        manager.create_initial_row();
        manager
    }

    fn create_initial_row(&mut self) {
        if self.can_add() {
            // A lista acabou de ser esvaziada, há sempre espaço.
            let _ = self.add_row_with(None);
        } else {
            self.sync_payload();
        }
    }

    pub fn master_options(&self) -> &[MasterOption] {
        &self.master
    }

    pub fn rows(&self) -> &[SelectionRow] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&SelectionRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn can_add(&self) -> bool {
        self.rows.len() < self.master.len()
    }

    /// Dica do botão "adicionar"; só existe quando o botão está desativado.
    pub fn add_button_title(&self) -> Option<&'static str> {
        (!self.can_add()).then_some(ADD_DISABLED_TITLE)
    }

    fn selected_values(&self) -> HashSet<&str> {
        self.rows.iter().filter_map(|r| r.value.as_deref()).collect()
    }

    fn available_options(&self) -> Vec<MasterOption> {
        let selected = self.selected_values();
        self.master.iter().filter(|o| !selected.contains(o.value.as_str())).cloned().collect()
    }

    pub fn add_row(&mut self) -> Result<RowId, SelectionError> {
        self.add_row_with(None)
    }

    /// Acrescenta uma linha com as opções ainda livres. `pre` escolhe já um
    /// valor, se estiver disponível.
    pub fn add_row_with(&mut self, pre: Option<&str>) -> Result<RowId, SelectionError> {
        if !self.can_add() {
            return Err(SelectionError::LimitReached);
        }
        self.counter += 1;
        let id = RowId(self.counter);
        let candidates = self.available_options();
        let value = pre
            .filter(|v| candidates.iter().any(|o| o.value == *v))
            .map(str::to_string);
        self.rows.push(SelectionRow { id, value, candidates });
        if pre.is_some() {
            self.refresh();
        } else {
            self.sync_payload();
        }
        tracing::debug!(row = %id, rows = self.rows.len(), "linha de funcionário adicionada");
        Ok(id)
    }

    /// Evento "change" de uma linha: grava o valor e recalcula todas.
    pub fn select(&mut self, id: RowId, value: Option<&str>) -> Result<(), SelectionError> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        let row = self.rows.iter_mut().find(|r| r.id == id).ok_or(SelectionError::UnknownRow(id))?;
        if let Some(v) = value {
            if !row.candidates.iter().any(|o| o.value == v) {
                return Err(SelectionError::Unavailable(v.to_string()));
            }
        }
        row.value = value.map(str::to_string);
        self.refresh();
        Ok(())
    }

    /// `true` se remover a linha exige confirmação (ela tem um valor).
    pub fn needs_confirmation(&self, id: RowId) -> Result<bool, SelectionError> {
        self.row(id).map(|r| r.value.is_some()).ok_or(SelectionError::UnknownRow(id))
    }

    /// Remove a linha. Se tiver um funcionário escolhido, pergunta antes e
    /// não mexe em nada se a resposta for negativa.
    pub async fn remove_row(&mut self, id: RowId, confirm: &dyn Confirm) -> Result<RemoveOutcome, SelectionError> {
        if self.needs_confirmation(id)? && !confirm.confirm(REMOVE_CONFIRM_MESSAGE).await {
            return Ok(RemoveOutcome::Declined);
        }
        let position = self.rows.iter().position(|r| r.id == id).ok_or(SelectionError::UnknownRow(id))?;
        self.rows.remove(position);
        self.refresh();
        tracing::debug!(row = %id, rows = self.rows.len(), "linha de funcionário removida");
        Ok(RemoveOutcome::Removed)
    }

    /// Reconstrói as opções de cada linha: tudo o que nenhuma *outra* linha
    /// escolheu, mais o valor da própria linha. Um valor que deixou de ser
    /// válido volta a vazio.
    pub fn refresh(&mut self) {
        let chosen: Vec<Option<String>> = self.rows.iter().map(|r| r.value.clone()).collect();
        for (i, row) in self.rows.iter_mut().enumerate() {
            let taken_by_others: HashSet<&str> = chosen
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .filter_map(|(_, v)| v.as_deref())
                .collect();
            let own = row.value.as_deref();
            row.candidates = self
                .master
                .iter()
                .filter(|o| Some(o.value.as_str()) == own || !taken_by_others.contains(o.value.as_str()))
                .cloned()
                .collect();
            let still_valid = own.map_or(false, |v| row.candidates.iter().any(|o| o.value == v));
            if !still_valid {
                row.value = None;
            }
        }
        self.sync_payload();
    }

    fn sync_payload(&mut self) {
        self.payload_json = serde_json::to_string(&self.selected_employees()).unwrap_or_else(|_| "[]".to_string());
    }

    /// Funcionários escolhidos, pela ordem das linhas.
    pub fn selected_employees(&self) -> Vec<MasterOption> {
        self.rows.iter().filter_map(|r| r.selected_option().cloned()).collect()
    }

    /// O mesmo que [`Self::selected_employees`], em JSON (campo escondido).
    pub fn payload_json(&self) -> &str {
        &self.payload_json
    }

    pub fn form_data(&self, fields: &FormFields) -> FormSnapshot {
        let obra = fields.site.as_ref().map(|site| {
            let text = site
                .options
                .iter()
                .find(|o| o.value == site.selected)
                .map(|o| o.text.clone())
                .unwrap_or_default();
            MasterOption { value: site.selected.clone(), text }
        });
        FormSnapshot {
            obra,
            hours: fields.hours.as_deref().map(parse_hours),
            date: fields.date.as_deref().map(dates::parse_iso_date),
            employees: self.selected_employees(),
        }
    }

    /// Valida o formulário inteiro. Todas as regras aplicáveis são verificadas,
    /// para que a lista de erros venha completa.
    pub fn is_valid_form(&self, fields: &FormFields, today: NaiveDate) -> FormValidation {
        let form = self.form_data(fields);
        let mut errors = Vec::new();

        if let Some(obra) = &form.obra {
            if obra.value.trim().is_empty() {
                errors.push(FormIssue::MissingSite);
            }
        }
        match form.date {
            Some(None) => errors.push(FormIssue::MissingDate),
            Some(Some(date)) if dates::lead_days(date, today) < dates::MIN_LEAD_DAYS => {
                errors.push(FormIssue::DateTooSoon)
            }
            _ => {}
        }
        if let Some(hours) = form.hours {
            if hours <= 0.0 {
                errors.push(FormIssue::InvalidHours);
            }
        }
        if form.employees.is_empty() {
            errors.push(FormIssue::NoEmployees);
        }
        if let Some(notes) = &fields.notes {
            if notes.trim().is_empty() {
                errors.push(FormIssue::MissingNotes);
            }
        }

        FormValidation { valid: errors.is_empty(), errors }
    }

    /// Volta ao estado inicial: uma única linha vazia, contador reiniciado.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.counter = 0;
        self.create_initial_row();
    }
}
