// src/views/requests.rs

use crate::modal::escape_html;
use crate::requests::{RequestRecord, RequestStatus};
use std::fmt::Write as _;

fn status_tag(status: RequestStatus) -> String {
    let class = match status {
        RequestStatus::Pendente => "status-pendente",
        RequestStatus::Aprovada => "status-aprovada",
        RequestStatus::Negada => "status-negada",
    };
    format!(r#"<span class="status-tag {class}">{}</span>"#, status.label())
}

fn display_date(r: &RequestRecord) -> String {
    r.date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_else(|| "-".to_string())
}

fn display_hours(r: &RequestRecord) -> String {
    r.hours.map(|h| format!("{h}h")).unwrap_or_else(|| "-".to_string())
}

pub fn list_content(list: &[RequestRecord]) -> String {
    if list.is_empty() {
        return r#"<div class="card"><h2 class="card-title">Requisições</h2><p class="text-muted">Nenhuma requisição registrada.</p></div>"#
            .to_string();
    }
    let mut rows = String::new();
    for r in list {
        let _ = write!(
            rows,
            r#"<tr><td><a href="/requisicoes/{id}">#{protocol}</a></td><td>{obra}</td><td>{date}</td><td>{hours}</td><td>{count}</td><td>{by}</td><td>{status}</td></tr>"#,
            id = r.id,
            protocol = r.protocol,
            obra = escape_html(r.obra.as_ref().map(|o| o.text.as_str()).unwrap_or("-")),
            date = display_date(r),
            hours = display_hours(r),
            count = r.employees.len(),
            by = escape_html(&r.requested_by),
            status = status_tag(r.status),
        );
    }
    format!(
        r#"<div class="card"><h2 class="card-title">Requisições</h2>
            <table><thead><tr><th>ID</th><th>Obra</th><th>Data</th><th>Horas</th><th>Funcionários</th><th>Solicitante</th><th>Situação</th></tr></thead>
            <tbody>{rows}</tbody></table></div>"#
    )
}

/// Detalhe de uma requisição. O formulário de análise só aparece para quem
/// pode analisar e enquanto a requisição estiver pendente.
pub fn detail_content(r: &RequestRecord, can_review: bool, comment: &str, comment_error: bool) -> String {
    let employees: String = r
        .employees
        .iter()
        .map(|e| format!("<li>{}</li>", escape_html(&e.text)))
        .collect();

    let review = if can_review && r.status == RequestStatus::Pendente {
        let border = if comment_error { " border-danger" } else { "" };
        format!(
            r#"<form method="POST" action="/requisicoes/{id}/aprovar" novalidate>
                <label for="comentarioGestor">Comentário do gestor</label>
                <textarea name="comentario" id="comentarioGestor" class="form-control{border}" rows="3">{comment}</textarea>
                <div class="acoes">
                    <button type="submit" class="btn btn-danger" id="btnNegar" formaction="/requisicoes/{id}/negar">Negar</button>
                    <button type="submit" class="btn btn-success" id="btnAprovar">Aprovar</button>
                </div>
            </form>"#,
            id = r.id,
            comment = escape_html(comment),
        )
    } else {
        match &r.comment {
            Some(c) => format!(
                r#"<p><strong>Comentário do gestor:</strong> {}</p><p class="text-muted small">{}</p>"#,
                escape_html(c),
                escape_html(r.reviewed_by.as_deref().unwrap_or(""))
            ),
            None => String::new(),
        }
    };

    format!(
        r#"<div class="card">
            <h2 class="card-title">Requisição #{protocol} {status}</h2>
            <p><strong>Solicitante:</strong> {by}</p>
            <p><strong>Obra:</strong> {obra}</p>
            <p><strong>Data:</strong> {date} &nbsp; <strong>Horas:</strong> {hours}</p>
            <p><strong>Funcionários:</strong></p><ul>{employees}</ul>
            <p><strong>Justificativa:</strong> {notes}</p>
            {review}
        </div>"#,
        protocol = r.protocol,
        status = status_tag(r.status),
        by = escape_html(&r.requested_by),
        obra = escape_html(r.obra.as_ref().map(|o| o.text.as_str()).unwrap_or("-")),
        date = display_date(r),
        hours = display_hours(r),
        notes = escape_html(&r.notes),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::MasterOption;

    fn record(status: RequestStatus) -> RequestRecord {
        RequestRecord {
            id: 3,
            protocol: 4242,
            requested_by: "encarregado@fortes.com".into(),
            obra: Some(MasterOption::new("o1", "Obra <Centro>")),
            hours: Some(2.5),
            date: chrono::NaiveDate::from_ymd_opt(2025, 3, 10),
            employees: vec![MasterOption::new("1", "Ana")],
            notes: "Laje".into(),
            status,
            comment: None,
            reviewed_by: None,
        }
    }

    #[test]
    fn review_form_only_for_pending_and_reviewers() {
        assert!(detail_content(&record(RequestStatus::Pendente), true, "", false).contains("btnNegar"));
        assert!(!detail_content(&record(RequestStatus::Pendente), false, "", false).contains("btnNegar"));
        assert!(!detail_content(&record(RequestStatus::Aprovada), true, "", false).contains("btnAprovar"));
        assert!(detail_content(&record(RequestStatus::Pendente), true, "", true).contains("border-danger"));
    }

    #[test]
    fn list_escapes_and_formats() {
        let html = list_content(&[record(RequestStatus::Negada)]);
        assert!(html.contains("Obra &lt;Centro&gt;"));
        assert!(html.contains("10/03/2025"));
        assert!(html.contains("2.5h"));
        assert!(html.contains("status-negada"));
        assert!(html.contains(r#"<a href="/requisicoes/3">#4242</a>"#));
    }
}
