// src/request_form.rs

//! # Formulário de solicitação de horas extras
//!
//! Liga o gestor de seleção, a verificação de datas e os diálogos ao fluxo
//! de envio e cancelamento de um formulário.

use crate::dates;
use crate::modal::{escape_html, Confirm, Modal, ModalButton, ModalKind};
use crate::selection::{FormFields, MasterOption, RowId, SelectionError, SelectionManager, SiteField};
use crate::submission::{SubmissionPayload, SubmitOutcome};
use chrono::NaiveDate;
use std::collections::HashMap;

pub const CANCEL_CONFIRM_MESSAGE: &str = "Tem certeza que deseja cancelar!?";
pub const DEFAULT_HOURS_STEP: f64 = 1.0;

/// Prefixo do nome dos seletores de funcionário (`row_3`).
pub const ROW_FIELD_PREFIX: &str = "row_";

/// Campos enviados pelo navegador. Campos que a página não tem chegam `None`.
#[derive(Debug, Default, Clone)]
pub struct RequestFormInput {
    pub obra: Option<String>,
    pub horas: Option<String>,
    pub data: Option<String>,
    pub justificativa: Option<String>,
    /// Valor de cada seletor de funcionário, por ordem de linha.
    pub rows: Vec<(RowId, Option<String>)>,
}

impl RequestFormInput {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let mut rows: Vec<(RowId, Option<String>)> = fields
            .iter()
            .filter_map(|(name, value)| {
                let id = name.strip_prefix(ROW_FIELD_PREFIX)?.parse::<u32>().ok()?;
                let value = Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string);
                Some((RowId(id), value))
            })
            .collect();
        rows.sort_by_key(|(id, _)| id.0);
        Self {
            obra: fields.get("obra").cloned(),
            horas: fields.get("horas").cloned(),
            data: fields.get("data").cloned(),
            justificativa: fields.get("justificativa").cloned(),
            rows,
        }
    }
}

/// Que campos existem na página, além dos seletores de funcionários.
#[derive(Debug, Clone, Copy)]
pub struct FormLayout {
    pub site: bool,
    pub hours: bool,
    pub date: bool,
    pub notes: bool,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self { site: true, hours: true, date: true, notes: true }
    }
}

/// Valores atuais dos campos, guardados entre pedidos.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    pub obra: String,
    pub horas: String,
    pub data: String,
    pub justificativa: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursStep {
    Up,
    Down,
}

/// Estado do formulário no momento do envio.
#[derive(Debug, Clone, PartialEq)]
struct Draft {
    values: FieldValues,
    rows: Vec<(RowId, Option<String>)>,
}

pub struct RequestForm {
    manager: SelectionManager,
    sites: Vec<MasterOption>,
    layout: FormLayout,
    values: FieldValues,
    hours_step: f64,
    in_flight: bool,
    submitted: Option<Draft>,
}

impl RequestForm {
    pub fn new(employees: Vec<MasterOption>, sites: Vec<MasterOption>) -> Self {
        Self::with_layout(employees, sites, FormLayout::default())
    }

    pub fn with_layout(employees: Vec<MasterOption>, sites: Vec<MasterOption>, layout: FormLayout) -> Self {
        Self {
            manager: SelectionManager::new(employees),
            sites,
            layout,
            values: FieldValues::default(),
            hours_step: DEFAULT_HOURS_STEP,
            in_flight: false,
            submitted: None,
        }
    }

    pub fn manager(&self) -> &SelectionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SelectionManager {
        &mut self.manager
    }

    pub fn sites(&self) -> &[MasterOption] {
        &self.sites
    }

    pub fn layout(&self) -> FormLayout {
        self.layout
    }

    pub fn values(&self) -> &FieldValues {
        &self.values
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    fn draft(&self) -> Draft {
        Draft {
            values: self.values.clone(),
            rows: self.manager.rows().iter().map(|r| (r.id(), r.value().map(str::to_string))).collect(),
        }
    }

    /// Guarda o que o navegador enviou, para os campos que vieram.
    pub fn remember(&mut self, input: &RequestFormInput) {
        self.apply_row_values(&input.rows);
        if let Some(v) = &input.obra {
            self.values.obra = v.clone();
        }
        if let Some(v) = &input.horas {
            self.values.horas = v.clone();
        }
        if let Some(v) = &input.data {
            self.values.data = v.clone();
        }
        if let Some(v) = &input.justificativa {
            self.values.justificativa = v.clone();
        }
    }

    /// Aplica os valores dos seletores. Linhas desconhecidas e valores que
    /// já não estão disponíveis numa linha são ignorados.
    pub fn apply_row_values(&mut self, values: &[(RowId, Option<String>)]) {
        for (id, value) in values {
            let Some(row) = self.manager.row(*id) else {
                tracing::debug!(row = %id, "linha enviada já não existe");
                continue;
            };
            if row.value() == value.as_deref() {
                continue;
            }
            match self.manager.select(*id, value.as_deref()) {
                Ok(()) => {}
                Err(SelectionError::Unavailable(v)) => {
                    tracing::debug!(row = %id, value = %v, "valor indisponível ignorado");
                }
                Err(e) => tracing::warn!(row = %id, error = %e, "falha ao aplicar seletor"),
            }
        }
    }

    pub fn fields(&self) -> FormFields {
        FormFields {
            site: self.layout.site.then(|| SiteField { options: self.sites.clone(), selected: self.values.obra.clone() }),
            hours: self.layout.hours.then(|| self.values.horas.clone()),
            date: self.layout.date.then(|| self.values.data.clone()),
            notes: self.layout.notes.then(|| self.values.justificativa.clone()),
        }
    }

    /// Botões +/- das horas: soma ou subtrai um passo, sem descer de zero.
    pub fn step_hours(&mut self, step: HoursStep) {
        let current = crate::selection::parse_hours(&self.values.horas);
        let next = match step {
            HoursStep::Up => current + self.hours_step,
            HoursStep::Down => (current - self.hours_step).max(0.0),
        };
        self.values.horas = format_hours(next);
    }

    /// Primeira metade do envio: valida e marca o formulário como "a enviar".
    ///
    /// Devolve o diálogo a mostrar quando o envio não pode seguir. O lock do
    /// formulário deve ser libertado antes de esperar pela API.
    pub fn begin_submission(&mut self, input: &RequestFormInput, today: NaiveDate) -> Result<SubmissionPayload, Modal> {
        self.remember(input);
        if self.in_flight {
            return Err(Modal::alert(
                "Envio em andamento",
                "<p>A solicitação anterior ainda está a ser enviada. Aguarde.</p>",
                ModalKind::Info,
            ));
        }

        let date = self.values.data.trim();
        if self.layout.date && !date.is_empty() && !dates::is_date_allowed(Some(date), today) {
            self.values.data.clear();
            return Err(date_warning_modal());
        }

        let fields = self.fields();
        let validation = self.manager.is_valid_form(&fields, today);
        if !validation.valid {
            let items: String = validation
                .errors
                .iter()
                .map(|e| format!("<div>• {}</div>", escape_html(&e.to_string())))
                .collect();
            return Err(Modal::alert("Corrija os seguintes erros", format!("<div>{items}</div>"), ModalKind::Warning)
                .with_buttons(vec![ModalButton::new("ok", "Voltar", "btn-primary")]));
        }

        self.in_flight = true;
        self.submitted = Some(self.draft());
        let notes = if self.layout.notes { self.values.justificativa.as_str() } else { "" };
        Ok(SubmissionPayload::new(self.manager.form_data(&fields), notes))
    }

    /// Segunda metade do envio: aplica a resposta da API.
    ///
    /// Depois de um envio aceite o formulário só é limpo se ninguém o alterou
    /// enquanto a API respondia.
    pub fn finish_submission(&mut self, outcome: &SubmitOutcome) -> Modal {
        self.in_flight = false;
        let untouched = self.submitted.take().is_some_and(|sent| sent == self.draft());
        match outcome {
            SubmitOutcome::Created { id, .. } => {
                if untouched {
                    self.reset();
                } else {
                    tracing::debug!(id, "formulário alterado durante o envio, alterações mantidas");
                }
                Modal::alert(
                    "Solicitação enviada",
                    format!(
                        "<p>Sua solicitação de horas extras foi registrada e encaminhada ao gestor para análise e aprovação. \
                         Você receberá uma notificação assim que houver uma atualização. <br>ID: <strong>{id}</strong></p>"
                    ),
                    ModalKind::Success,
                )
            }
            SubmitOutcome::Failed { error, .. } => {
                Modal::alert("Falha ao enviar", format!("<p>{}</p>", escape_html(error)), ModalKind::Danger)
            }
        }
    }

    /// Botão "Cancelar": pede confirmação e limpa tudo.
    pub async fn cancel(&mut self, confirm: &dyn Confirm) -> Option<Modal> {
        if !confirm.confirm(CANCEL_CONFIRM_MESSAGE).await {
            return None;
        }
        self.reset();
        Some(Modal::alert("Entrada apagada", "<p>Entradas apagadas.</p>", ModalKind::Info))
    }

    pub fn reset(&mut self) {
        self.values = FieldValues::default();
        self.manager.reset();
    }
}

pub fn date_warning_modal() -> Modal {
    Modal::alert(
        "Agendamento não permitido",
        "<p class=\"mb-0\">Solicitações de hora extra devem ser feitas com no mínimo 03 dias de antecedência. \
         Por favor, revise a data escolhida e tente novamente.</p>",
        ModalKind::Warning,
    )
}

fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}", hours as i64)
    } else {
        format!("{hours}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::BoxFuture;

    struct Answer(bool);

    impl Confirm for Answer {
        fn confirm<'a>(&'a self, _message: &'a str) -> BoxFuture<'a, bool> {
            Box::pin(async move { self.0 })
        }
    }

    fn form() -> RequestForm {
        RequestForm::new(
            vec![MasterOption::new("1", "Ana"), MasterOption::new("2", "Bruno")],
            vec![MasterOption::new("o1", "Obra Centro")],
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn input(date: &str) -> RequestFormInput {
        RequestFormInput {
            obra: Some("o1".into()),
            horas: Some("3".into()),
            data: Some(date.into()),
            justificativa: Some("Concretagem da laje".into()),
            rows: Vec::new(),
        }
    }

    fn pick_first(f: &mut RequestForm) {
        let row = f.manager().rows()[0].id();
        f.manager_mut().select(row, Some("1")).unwrap();
    }

    #[test]
    fn early_date_shows_warning_and_clears_the_field() {
        let mut f = form();
        pick_first(&mut f);
        let modal = f.begin_submission(&input("2025-01-02"), today()).unwrap_err();
        assert_eq!(modal.title, "Agendamento não permitido");
        assert_eq!(f.values().data, "");
        assert!(!f.is_in_flight());
    }

    #[test]
    fn invalid_form_lists_every_error() {
        let mut f = form();
        let modal = f
            .begin_submission(&RequestFormInput { horas: Some("0".into()), ..Default::default() }, today())
            .unwrap_err();
        assert_eq!(modal.title, "Corrija os seguintes erros");
        assert_eq!(modal.buttons[0].label, "Voltar");
        for msg in ["Selecione a obra.", "Informe a data.", "Informe a quantidade de horas", "Adicione ao menos um funcionário.", "Preencha a justificativa."] {
            assert!(modal.body_html.contains(msg), "faltou {msg}");
        }
    }

    #[test]
    fn second_submit_is_rejected_while_in_flight() {
        let mut f = form();
        pick_first(&mut f);
        let payload = f.begin_submission(&input("2025-01-10"), today()).unwrap();
        assert_eq!(payload.notes, "Concretagem da laje");
        assert_eq!(payload.employees.len(), 1);
        assert!(f.is_in_flight());

        let busy = f.begin_submission(&input("2025-01-10"), today()).unwrap_err();
        assert_eq!(busy.title, "Envio em andamento");

        let modal = f.finish_submission(&SubmitOutcome::failed("Erro interno"));
        assert_eq!(modal.kind, ModalKind::Danger);
        assert!(!f.is_in_flight());
        // Falha mantém o que foi preenchido.
        assert_eq!(f.values().obra, "o1");
        assert_eq!(f.manager().selected_employees().len(), 1);
    }

    #[test]
    fn success_resets_the_form() {
        let mut f = form();
        pick_first(&mut f);
        f.manager_mut().add_row().unwrap();
        f.begin_submission(&input("2025-01-10"), today()).unwrap();
        let modal = f.finish_submission(&SubmitOutcome::created(4242));
        assert!(modal.body_html.contains("<strong>4242</strong>"));
        assert_eq!(f.values(), &FieldValues::default());
        assert_eq!(f.manager().rows().len(), 1);
        assert!(f.manager().selected_employees().is_empty());
    }

    #[test]
    fn edits_made_while_sending_survive_success() {
        let mut f = form();
        pick_first(&mut f);
        f.begin_submission(&input("2025-01-10"), today()).unwrap();

        f.remember(&RequestFormInput { justificativa: Some("Outra obra".into()), ..Default::default() });
        let second = f.manager_mut().add_row().unwrap();
        f.manager_mut().select(second, Some("2")).unwrap();

        let modal = f.finish_submission(&SubmitOutcome::created(4242));
        assert_eq!(modal.title, "Solicitação enviada");
        assert!(!f.is_in_flight());
        assert_eq!(f.values().justificativa, "Outra obra");
        assert_eq!(f.manager().selected_employees().len(), 2);

        // O envio seguinte volta a limpar o que foi enviado.
        f.begin_submission(&input("2025-01-10"), today()).unwrap();
        f.finish_submission(&SubmitOutcome::created(4243));
        assert_eq!(f.values(), &FieldValues::default());
    }

    #[tokio::test]
    async fn cancel_needs_a_yes() {
        let mut f = form();
        pick_first(&mut f);
        f.remember(&input("2025-01-10"));

        assert!(f.cancel(&Answer(false)).await.is_none());
        assert_eq!(f.values().obra, "o1");

        let modal = f.cancel(&Answer(true)).await.unwrap();
        assert_eq!(modal.body_html, "<p>Entradas apagadas.</p>");
        assert_eq!(f.values().obra, "");
        assert!(f.manager().selected_employees().is_empty());
    }

    #[test]
    fn hours_stepper_stops_at_zero() {
        let mut f = form();
        f.step_hours(HoursStep::Down);
        assert_eq!(f.values().horas, "0");
        f.step_hours(HoursStep::Up);
        f.step_hours(HoursStep::Up);
        assert_eq!(f.values().horas, "2");
        f.remember(&RequestFormInput { horas: Some("0.5".into()), ..Default::default() });
        f.step_hours(HoursStep::Up);
        assert_eq!(f.values().horas, "1.5");
    }

    #[test]
    fn posted_row_values_are_applied_and_conflicts_ignored() {
        let mut f = form();
        let second = f.manager_mut().add_row().unwrap();
        let first = f.manager().rows()[0].id();
        let fields: HashMap<String, String> = [
            (format!("row_{}", first.0), "2".to_string()),
            (format!("row_{}", second.0), "2".to_string()),
            ("row_99".to_string(), "1".to_string()),
            ("horas".to_string(), "4".to_string()),
        ]
        .into_iter()
        .collect();
        let input = RequestFormInput::from_fields(&fields);
        assert_eq!(input.rows.len(), 3);
        assert_eq!(input.obra, None);

        f.remember(&input);
        assert_eq!(f.manager().row(first).unwrap().value(), Some("2"));
        assert_eq!(f.manager().row(second).unwrap().value(), None);
        assert_eq!(f.values().horas, "4");
    }

    #[test]
    fn pages_without_optional_fields_skip_their_rules() {
        let layout = FormLayout { site: false, hours: false, date: false, notes: false };
        let mut f = RequestForm::with_layout(vec![MasterOption::new("1", "Ana")], vec![], layout);
        pick_first(&mut f);
        let payload = f.begin_submission(&RequestFormInput::default(), today()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({ "employees": [{ "value": "1", "text": "Ana" }], "notes": "" }));
    }
}
