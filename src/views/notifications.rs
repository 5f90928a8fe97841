// src/views/notifications.rs

use crate::modal::escape_html;
use crate::notifications::Notification;
use std::fmt::Write as _;

pub fn notifications_content(list: &[Notification]) -> String {
    if list.is_empty() {
        return r#"<div class="card"><h2 class="card-title">Notificações</h2><p class="text-muted">Nenhuma notificação</p></div>"#
            .to_string();
    }

    let mut items = String::new();
    for (index, n) in list.iter().enumerate() {
        let action = if n.read {
            r#"<span class="text-muted small">Lida</span>"#.to_string()
        } else {
            format!(
                r#"<form method="POST" action="/notificacoes/{index}/lida"><input type="hidden" name="voltar" value="/notificacoes">
                    <button type="submit" class="btn btn-sm btn-outline-secondary">Marcar como lida</button></form>"#
            )
        };
        let _ = write!(
            items,
            r#"<li class="d-flex justify-content-between align-items-center{faded}">
                <div class="d-flex gap-2"><i class="bi bi-{icon}"></i>
                    <div><strong>{title}</strong><p class="mb-0 small">{message}</p><small class="text-muted">{date}</small></div>
                </div>{action}
            </li>"#,
            faded = if n.read { " opacity-75" } else { "" },
            icon = n.kind.icon(),
            title = escape_html(&n.title),
            message = escape_html(&n.message),
            date = escape_html(&n.date),
        );
    }

    let mark_all = if list.iter().any(|n| !n.read) {
        r#"<form method="POST" action="/notificacoes/lidas"><input type="hidden" name="voltar" value="/notificacoes">
            <button type="submit" class="btn btn-sm btn-primary">Marcar todas como lidas</button></form>"#
    } else {
        ""
    };

    format!(
        r#"<div class="card">
            <div class="d-flex justify-content-between align-items-center"><h2 class="card-title">Notificações</h2>{mark_all}</div>
            <ul class="item-list">{items}</ul>
        </div>"#
    )
}
