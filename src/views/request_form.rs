// src/views/request_form.rs

//! Página "Nova Solicitação".
//!
//! A página inteira é um único `<form>`: cada botão escolhe o seu destino com
//! `formaction`, para que todos os campos preenchidos viajem em cada pedido.

use crate::modal::escape_html;
use crate::request_form::{RequestForm, ROW_FIELD_PREFIX};
use crate::selection::{SelectionRow, NONE_SELECTED_LABEL};
use std::fmt::Write as _;

pub const PAGE_PATH: &str = "/solicitacao";

fn option_html(value: &str, text: &str, selected: bool) -> String {
    let sel = if selected { " selected" } else { "" };
    format!(r#"<option value="{}"{sel}>{}</option>"#, escape_html(value), escape_html(text))
}

fn row_html(row: &SelectionRow) -> String {
    let mut options = option_html("", NONE_SELECTED_LABEL, row.value().is_none());
    for candidate in row.candidates() {
        options.push_str(&option_html(&candidate.value, &candidate.text, row.value() == Some(candidate.value.as_str())));
    }
    let n = row.id().0;
    format!(
        r#"<div class="linha-funcionario" id="{id}">
            <select name="{ROW_FIELD_PREFIX}{n}" class="form-select" onchange="this.form.action='/solicitacao/funcionarios/selecionar'; this.form.submit();">{options}</select>
            <button type="submit" class="btn btn-outline-secondary btn-sm btn-remover" formaction="/solicitacao/funcionarios/remover" name="row_id" value="{n}" title="Remover">🗑</button>
        </div>"#,
        id = row.id(),
    )
}

pub fn request_form_content(form: &RequestForm) -> String {
    let layout = form.layout();
    let values = form.values();
    let manager = form.manager();

    let mut site_html = String::new();
    if layout.site {
        let mut options = option_html("", "Selecione a obra", values.obra.is_empty());
        for site in form.sites() {
            options.push_str(&option_html(&site.value, &site.text, site.value == values.obra));
        }
        let _ = write!(site_html, r#"<label for="obra">Obra</label><select name="obra" id="obra">{options}</select>"#);
    }

    let date_html = if layout.date {
        format!(
            r#"<label for="data">Data</label><input type="date" name="data" id="data" value="{}">"#,
            escape_html(&values.data)
        )
    } else {
        String::new()
    };

    let hours_html = if layout.hours {
        format!(
            r#"<label for="horas">Quantidade de horas</label>
            <div class="stepper">
                <button type="submit" class="btn btn-sm" formaction="/solicitacao/horas" name="passo" value="down" aria-label="Diminuir">−</button>
                <input type="number" name="horas" id="horas" min="0" step="1" value="{}">
                <button type="submit" class="btn btn-sm" formaction="/solicitacao/horas" name="passo" value="up" aria-label="Aumentar">+</button>
            </div>"#,
            escape_html(&values.horas)
        )
    } else {
        String::new()
    };

    let rows: String = manager.rows().iter().map(row_html).collect();
    let add_attrs = match manager.add_button_title() {
        Some(title) => format!(r#" disabled title="{}""#, escape_html(title)),
        None => String::new(),
    };

    let notes_html = if layout.notes {
        format!(
            r#"<label for="justificativa">Justificativa</label><textarea name="justificativa" id="justificativa" rows="4">{}</textarea>"#,
            escape_html(&values.justificativa)
        )
    } else {
        String::new()
    };

    let sending = if form.is_in_flight() { " disabled" } else { "" };

    format!(
        r#"
        <form method="POST" action="/solicitacao/enviar" id="formSolicitacao" class="card" novalidate>
            <h2 class="card-title">Solicitação de Horas Extras</h2>
            {site_html}
            {date_html}
            {hours_html}
            <label>Funcionários</label>
            <div id="listaFuncionarios">{rows}</div>
            <div id="addPlaceholder">
                <button type="submit" class="btn btn-outline-secondary btn-sm" id="btnAdicionar" formaction="/solicitacao/funcionarios/adicionar"{add_attrs}>+ Adicionar funcionário</button>
            </div>
            <input type="hidden" name="funcionarios_json" id="funcionariosJson" value="{payload}">
            {notes_html}
            <div class="acoes">
                <button type="submit" class="btn btn-secondary" id="btnCancelar" formaction="/solicitacao/cancelar">Cancelar</button>
                <button type="submit" class="btn btn-primary" id="btnEnviar"{sending}>Enviar</button>
            </div>
        </form>
        "#,
        payload = escape_html(manager.payload_json()),
    )
}
