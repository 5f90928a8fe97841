// src/modal.rs

//! # Diálogos de mensagem e confirmação
//!
//! Um [`Modal`] descreve o diálogo (título, corpo HTML, tipo e botões). A
//! função [`show_modal`] devolve o `id` do botão clicado, ou `None` se o
//! diálogo foi fechado sem escolha. Sem um [`DialogHost`] disponível cai nos
//! diálogos nativos do navegador ([`NativeDialogs`]).

use futures_util::future::BoxFuture;
use std::fmt::Write as _;

/// Fecha o diálogo no próprio navegador, sem novo pedido.
const CLOSE_OVERLAY: &str = "this.closest('.modal-backdrop-portal').remove(); return false;";

/// Resposta enviada pelo "×" de um diálogo: fechado sem escolher um botão.
pub const DISMISSED: &str = "dismiss";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalKind {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl ModalKind {
    fn icon_html(self) -> &'static str {
        match self {
            ModalKind::Warning => r#"<i class="bi bi-exclamation-triangle-fill text-warning me-2"></i>"#,
            ModalKind::Danger => r#"<i class="bi bi-x-circle-fill text-danger me-2"></i>"#,
            ModalKind::Success => r#"<i class="bi bi-check-circle-fill text-success me-2"></i>"#,
            ModalKind::Info => r#"<i class="bi bi-info-circle-fill text-info me-2"></i>"#,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalButton {
    pub id: String,
    pub label: String,
    pub class_name: String,
    pub dismiss: bool,
}

impl ModalButton {
    pub fn new(id: &str, label: &str, class_name: &str) -> Self {
        Self { id: id.to_string(), label: label.to_string(), class_name: class_name.to_string(), dismiss: true }
    }

    pub fn ok() -> Self {
        Self::new("ok", "OK", "btn-primary")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Modal {
    pub title: String,
    pub body_html: String,
    pub kind: ModalKind,
    pub buttons: Vec<ModalButton>,
}

impl Modal {
    /// Diálogo de aviso com um único botão "OK".
    pub fn alert(title: &str, body_html: impl Into<String>, kind: ModalKind) -> Self {
        Self { title: title.to_string(), body_html: body_html.into(), kind, buttons: vec![ModalButton::ok()] }
    }

    /// Pergunta de sim/não (`yes`/`no`).
    pub fn confirm(title: &str, message: &str) -> Self {
        Self {
            title: title.to_string(),
            body_html: format!("<p>{}</p>", escape_html(message)),
            kind: ModalKind::Warning,
            buttons: vec![
                ModalButton::new("no", "Não", "btn-secondary"),
                ModalButton::new("yes", "Sim", "btn-danger"),
            ],
        }
    }

    pub fn with_buttons(mut self, buttons: Vec<ModalButton>) -> Self {
        self.buttons = buttons;
        self
    }

    fn is_yes_no(&self) -> bool {
        self.buttons.len() == 2
            && self.buttons.iter().any(|b| b.id == "yes")
            && self.buttons.iter().any(|b| b.id == "no")
    }

    /// Texto para os diálogos nativos: título, linha em branco e o corpo sem tags.
    pub fn plain_text(&self) -> String {
        let body = strip_tags(&self.body_html);
        if self.title.is_empty() {
            body
        } else {
            format!("{}\n\n{}", self.title, body)
        }
    }

    /// Desenha o diálogo rico. Cada botão envia o seu `id` no campo
    /// `resposta` para `action`; sem `action` os botões apenas fecham.
    pub fn render(&self, action: Option<&str>, hidden: &[(&str, &str)]) -> String {
        let footer_class = if self.buttons.len() == 1 {
            "modal-footer d-flex justify-content-center"
        } else {
            "modal-footer d-flex justify-content-end"
        };
        let mut buttons = String::new();
        for b in &self.buttons {
            let label = if b.label.is_empty() { &b.id } else { &b.label };
            match action {
                Some(_) => {
                    let _ = write!(
                        buttons,
                        r#"<button type="submit" name="resposta" value="{}" class="btn {}">{}</button>"#,
                        escape_html(&b.id),
                        b.class_name,
                        escape_html(label)
                    );
                }
                None => {
                    let _ = write!(
                        buttons,
                        r##"<a href="#" class="btn {}" data-bs-dismiss="modal" onclick="{CLOSE_OVERLAY}">{}</a>"##,
                        b.class_name,
                        escape_html(label)
                    );
                }
            }
        }
        let footer = match action {
            Some(url) => {
                let mut fields = String::new();
                for (name, value) in hidden {
                    let _ = write!(
                        fields,
                        r#"<input type="hidden" name="{}" value="{}">"#,
                        name,
                        escape_html(value)
                    );
                }
                format!(r#"<form method="POST" action="{url}" id="modalForm" class="{footer_class}">{fields}{buttons}</form>"#)
            }
            None => format!(r#"<div class="{footer_class}">{buttons}</div>"#),
        };
        format!(
            r#"<div class="modal-backdrop-portal" role="dialog" aria-modal="true" aria-labelledby="messageModalLabel">
                <div class="modal-card">
                    <div class="modal-header border-0">
                        <h5 class="modal-title" id="messageModalLabel">{icon}{title}</h5>
                        {close}
                    </div>
                    <div class="modal-body" id="messageModalBody">{body}</div>
                    {footer}
                </div>
            </div>"#,
            icon = self.kind.icon_html(),
            close = if action.is_some() {
                format!(r#"<button type="submit" form="modalForm" name="resposta" value="{DISMISSED}" class="btn-close" aria-label="Close">×</button>"#)
            } else {
                format!(r##"<a href="#" class="btn-close" aria-label="Close" onclick="{CLOSE_OVERLAY}">×</a>"##)
            },
            title = escape_html(&self.title),
            body = self.body_html,
        )
    }

    /// Alternativa com `confirm()`/`alert()` do navegador para quando o
    /// diálogo rico está desligado. A resposta segue no mesmo campo `resposta`.
    pub fn render_native_script(&self, action: Option<&str>, hidden: &[(&str, &str)]) -> String {
        let text = serde_json::to_string(&self.plain_text()).unwrap_or_else(|_| "\"\"".to_string());
        let first = self.buttons.first().map(|b| b.id.as_str()).unwrap_or("");
        let Some(url) = action else {
            return format!("<script>window.alert({text});</script>");
        };
        let mut fields = String::new();
        for (name, value) in hidden {
            let _ = write!(fields, r#"<input type="hidden" name="{}" value="{}">"#, name, escape_html(value));
        }
        let answer = if self.is_yes_no() {
            format!("window.confirm({text}) ? 'yes' : 'no'")
        } else {
            format!("(window.alert({text}), {})", serde_json::Value::from(first))
        };
        format!(
            r#"<form method="POST" action="{url}" id="nativeDialogForm">{fields}<input type="hidden" name="resposta" id="nativeDialogAnswer"></form>
            <script>
                document.getElementById('nativeDialogAnswer').value = {answer};
                document.getElementById('nativeDialogForm').submit();
            </script>"#
        )
    }
}

/// Apresenta um diálogo rico e espera pelo botão escolhido.
pub trait DialogHost: Send + Sync {
    fn present<'a>(&'a self, modal: &'a Modal) -> BoxFuture<'a, Option<String>>;
}

/// Diálogos nativos do navegador.
pub trait NativeDialogs: Send + Sync {
    fn confirm(&self, text: &str) -> bool;
    fn alert(&self, text: &str);
}

/// Mostra o diálogo e devolve o `id` do botão clicado.
///
/// Sem `host`, um par `yes`/`no` usa a confirmação nativa; qualquer outro
/// conjunto de botões usa o alerta nativo e devolve o primeiro botão.
pub async fn show_modal(host: Option<&dyn DialogHost>, native: &dyn NativeDialogs, modal: &Modal) -> Option<String> {
    if let Some(host) = host {
        return host.present(modal).await;
    }
    let text = modal.plain_text();
    if modal.is_yes_no() {
        let answer = if native.confirm(&text) { "yes" } else { "no" };
        return Some(answer.to_string());
    }
    native.alert(&text);
    modal.buttons.first().map(|b| b.id.clone())
}

/// Confirmação assíncrona injetada nos componentes: `true` para prosseguir.
pub trait Confirm: Send + Sync {
    fn confirm<'a>(&'a self, message: &'a str) -> BoxFuture<'a, bool>;
}

/// Confirmação via [`show_modal`] com os botões "Não"/"Sim".
pub struct ModalConfirm<'a> {
    pub host: Option<&'a dyn DialogHost>,
    pub native: &'a dyn NativeDialogs,
    pub title: &'a str,
}

impl Confirm for ModalConfirm<'_> {
    fn confirm<'a>(&'a self, message: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let modal = Modal::confirm(self.title, message);
            show_modal(self.host, self.native, &modal).await.as_deref() == Some("yes")
        })
    }
}

/// Resposta já enviada pelo navegador no campo `resposta`.
///
/// No servidor o diálogo "resolve-se" no pedido seguinte: o botão escolhido
/// chega no formulário. Serve tanto de [`DialogHost`] como de
/// [`NativeDialogs`].
#[derive(Debug, Clone, Default)]
pub struct PostedAnswer(pub Option<String>);

impl PostedAnswer {
    pub fn new(raw: Option<&str>) -> Self {
        Self(raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
    }

    pub fn is_answered(&self) -> bool {
        self.0.is_some()
    }

    /// Confirmação resolvida por esta resposta, pelo diálogo rico ou pelo nativo.
    pub fn as_confirm<'a>(&'a self, rich_dialogs: bool, title: &'a str) -> ModalConfirm<'a> {
        let host = if rich_dialogs { Some(self as &'a dyn DialogHost) } else { None };
        ModalConfirm { host, native: self, title }
    }
}

impl DialogHost for PostedAnswer {
    fn present<'a>(&'a self, _modal: &'a Modal) -> BoxFuture<'a, Option<String>> {
        Box::pin(async move { self.0.clone().filter(|a| a != DISMISSED) })
    }
}

impl NativeDialogs for PostedAnswer {
    fn confirm(&self, _text: &str) -> bool {
        self.0.as_deref() == Some("yes")
    }

    fn alert(&self, _text: &str) {}
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Substitui cada tag HTML por uma quebra de linha.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match (c, in_tag) {
            ('<', _) => in_tag = true,
            ('>', true) => {
                in_tag = false;
                out.push('\n');
            }
            (_, true) => {}
            (_, false) => out.push(c),
        }
    }
    out
}
