use chrono::{Duration as ChronoDuration, Local};
use futures_util::future::BoxFuture;
use portal_horas::auth::AppState;
use portal_horas::catalog::Catalog;
use portal_horas::config::PortalConfig;
use portal_horas::selection::MasterOption;
use portal_horas::store::MemoryStore;
use portal_horas::submission::{SubmissionGateway, SubmissionPayload, SubmitOutcome};
use portal_horas::users::CredentialDirectory;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

struct InstantGateway(u32);

impl SubmissionGateway for InstantGateway {
    fn submit<'a>(&'a self, _payload: &'a SubmissionPayload) -> BoxFuture<'a, SubmitOutcome> {
        Box::pin(async move { SubmitOutcome::created(self.0) })
    }
}

struct SlowGateway(Duration);

impl SubmissionGateway for SlowGateway {
    fn submit<'a>(&'a self, _payload: &'a SubmissionPayload) -> BoxFuture<'a, SubmitOutcome> {
        Box::pin(async move {
            tokio::time::sleep(self.0).await;
            SubmitOutcome::created(5151)
        })
    }
}

/// Falha com pânico no primeiro envio e aceita os seguintes.
struct FlakyGateway(AtomicBool);

impl SubmissionGateway for FlakyGateway {
    fn submit<'a>(&'a self, _payload: &'a SubmissionPayload) -> BoxFuture<'a, SubmitOutcome> {
        Box::pin(async move {
            if !self.0.swap(true, Ordering::SeqCst) {
                panic!("API indisponível");
            }
            SubmitOutcome::created(6161)
        })
    }
}

async fn spawn_portal() -> SocketAddr {
    spawn_portal_with(true, Arc::new(InstantGateway(4242))).await
}

async fn spawn_portal_with(rich_dialogs: bool, gateway: Arc<dyn SubmissionGateway>) -> SocketAddr {
    let config = PortalConfig {
        fragments_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
        bcrypt_cost: 4,
        rich_dialogs,
        ..PortalConfig::default()
    };
    let catalog = Catalog {
        funcionarios: vec![MasterOption::new("1", "Ana"), MasterOption::new("2", "Bruno")],
        obras: vec![MasterOption::new("o1", "Obra Centro")],
    };
    let state = AppState::new(
        config,
        Arc::new(MemoryStore::new()),
        CredentialDirectory::with_defaults(4).expect("credentials"),
        catalog,
        gateway,
    );
    let app = portal_horas::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.expect("serve");
    });
    addr
}

fn submit_form(days_ahead: i64) -> String {
    let date = (Local::now().date_naive() + ChronoDuration::days(days_ahead)).format("%Y-%m-%d");
    format!("obra=o1&horas=2&data={date}&justificativa=Concretagem+da+laje&row_1=1")
}

async fn send(addr: SocketAddr, method: &str, path: &str, cookie: Option<&str>, form: Option<&str>) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(c) = cookie {
        req.push_str(&format!("Cookie: {c}\r\n"));
    }
    if let Some(body) = form {
        req.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    req.push_str("\r\n");
    if let Some(body) = form {
        req.push_str(body);
    }
    stream.write_all(req.as_bytes()).await.expect("write request");
    let mut response = String::new();
    stream.read_to_string(&mut response).await.expect("read response");
    let (head, body) = response.split_once("\r\n\r\n").expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}

async fn login(addr: SocketAddr, email: &str, password: &str) -> String {
    let body = format!("username={}&password={password}", email.replace('@', "%40"));
    let (status, head, _) = send(addr, "POST", "/login", None, Some(&body)).await;
    assert_eq!(status, 303);
    assert_eq!(header(&head, "location"), Some("/main"));
    let set_cookie = header(&head, "set-cookie").expect("session cookie");
    set_cookie.split(';').next().expect("cookie pair").to_string()
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_guards_pages() {
    let addr = spawn_portal().await;

    let (status, _, body) = send(addr, "GET", "/", None, None).await;
    assert_eq!(status, 200);
    assert!(body.contains("loginForm"));

    let (status, _, body) = send(addr, "POST", "/login", None, Some("username=gestor%40fortes.com&password=0000")).await;
    assert_eq!(status, 200);
    assert!(body.contains("Usuário ou senha incorretos."));
    assert!(body.contains(".select()"));

    let (status, head, _) = send(addr, "GET", "/main", None, None).await;
    assert_eq!(status, 303);
    assert_eq!(header(&head, "location"), Some("/"));
}

#[tokio::test]
async fn navigation_follows_the_role() {
    let addr = spawn_portal().await;
    let cookie = login(addr, "GESTOR@fortes.com", "5678").await;
    let (status, _, body) = send(addr, "GET", "/main", Some(&cookie), None).await;
    assert_eq!(status, 200);
    assert!(body.contains("Você está logado como: Gestor"));
    assert!(body.contains(r#"<a href="/main" class="active">"#));
    assert!(!body.contains(r#"href="/solicitacao""#));

    let (_, _, body) = send(addr, "GET", "/relatorios", Some(&cookie), None).await;
    assert!(body.contains("Recurso em desenvolvimento"));
}

#[tokio::test]
async fn request_is_submitted_reviewed_and_notified() {
    let addr = spawn_portal().await;
    let worker = login(addr, "encarregado@fortes.com", "1234").await;

    let (status, _, body) = send(addr, "GET", "/solicitacao", Some(&worker), None).await;
    assert_eq!(status, 200);
    assert!(body.contains(r#"id="select_1""#));
    assert!(!body.contains("disabled title"));

    let (status, _, _) = send(addr, "POST", "/solicitacao/funcionarios/adicionar", Some(&worker), Some("row_1=1&obra=o1")).await;
    assert_eq!(status, 303);
    let (_, _, body) = send(addr, "GET", "/solicitacao", Some(&worker), None).await;
    assert!(body.contains(r#"id="select_2""#));
    assert!(body.contains("disabled title"));

    let (_, _, json) = send(addr, "GET", "/solicitacao/funcionarios", Some(&worker), None).await;
    let employees: serde_json::Value = serde_json::from_str(&json).expect("json");
    assert_eq!(employees, serde_json::json!([{ "value": "1", "text": "Ana" }]));

    // Linha preenchida pede confirmação antes de sair.
    let (_, _, body) = send(addr, "POST", "/solicitacao/funcionarios/remover", Some(&worker), Some("row_id=1")).await;
    assert!(body.contains("Tem certeza que deseja excluir este funcionário?"));
    let (status, _, _) = send(addr, "POST", "/solicitacao/funcionarios/remover", Some(&worker), Some("row_id=1&resposta=no")).await;
    assert_eq!(status, 303);

    let too_soon = (Local::now().date_naive() + ChronoDuration::days(1)).format("%Y-%m-%d");
    let form = format!("obra=o1&horas=2&data={too_soon}&justificativa=Laje");
    let (_, _, body) = send(addr, "POST", "/solicitacao/enviar", Some(&worker), Some(&form)).await;
    assert!(body.contains("Agendamento não permitido"));

    let (status, _, body) = send(addr, "POST", "/solicitacao/enviar", Some(&worker), Some(&submit_form(10))).await;
    assert_eq!(status, 200);
    assert!(body.contains("Solicitação enviada"));
    assert!(body.contains("<strong>4242</strong>"));

    let manager = login(addr, "gestor@fortes.com", "5678").await;
    let (_, _, body) = send(addr, "GET", "/requisicoes", Some(&manager), None).await;
    assert!(body.contains(r#"<a href="/requisicoes/1">#4242</a>"#));
    let (_, _, body) = send(addr, "GET", "/main", Some(&manager), None).await;
    assert!(body.contains(r#"id="badgeNotificacoes">1</span>"#));

    let (_, _, body) = send(addr, "POST", "/requisicoes/1/negar", Some(&manager), Some("comentario=")).await;
    assert!(body.contains("O comentário é obrigatório."));
    let (_, _, body) = send(addr, "POST", "/requisicoes/1/negar", Some(&manager), Some("comentario=Sem+verba")).await;
    assert!(body.contains("Tem certeza que deseja negar!?"));
    let (_, _, body) = send(addr, "POST", "/requisicoes/1/negar", Some(&manager), Some("comentario=Sem+verba&resposta=yes")).await;
    assert!(body.contains("Requisição negada com sucesso."));

    let (status, _, _) = send(addr, "POST", "/requisicoes/1/aprovar", Some(&worker), Some("comentario=ok")).await;
    assert_eq!(status, 403);

    let (_, _, body) = send(addr, "GET", "/notificacoes", Some(&worker), None).await;
    assert!(body.contains("Solicitação Negada"));
    assert!(body.contains("Solicitação enviada"));
    let (status, head, _) = send(addr, "POST", "/notificacoes/lidas", Some(&worker), Some("voltar=%2Fmain")).await;
    assert_eq!(status, 303);
    assert_eq!(header(&head, "location"), Some("/main"));
    let (_, _, body) = send(addr, "GET", "/main", Some(&worker), None).await;
    assert!(!body.contains("badgeNotificacoes"));
}

#[tokio::test]
async fn profile_change_moves_login() {
    let addr = spawn_portal().await;
    let cookie = login(addr, "encarregado@fortes.com", "1234").await;

    let (_, _, body) = send(addr, "POST", "/perfil", Some(&cookie), Some("new_password=abc&confirm_password=abc&current_password=1234")).await;
    assert!(body.contains("A nova senha deve ter no mínimo 6 caracteres."));

    let form = "new_email=obra%40fortes.com&confirm_email=obra%40fortes.com&current_password=1234";
    let (_, _, body) = send(addr, "POST", "/perfil", Some(&cookie), Some(form)).await;
    assert!(body.contains("Alterações Salvas"));
    assert!(body.contains(r#"value="obra@fortes.com" readonly"#));

    let (status, _, _) = send(addr, "POST", "/login", None, Some("username=encarregado%40fortes.com&password=1234")).await;
    assert_eq!(status, 200);
    login(addr, "obra@fortes.com", "1234").await;
}

#[tokio::test]
async fn abandoned_submit_still_finishes_and_frees_the_form() {
    let addr = spawn_portal_with(true, Arc::new(SlowGateway(Duration::from_millis(400)))).await;
    let worker = login(addr, "encarregado@fortes.com", "1234").await;

    // O navegador fecha a ligação antes de a API responder.
    {
        let body = submit_form(10);
        let mut stream = tokio::net::TcpStream::connect(addr).await.expect("connect server");
        let req = format!(
            "POST /solicitacao/enviar HTTP/1.1\r\nHost: {addr}\r\nCookie: {worker}\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(req.as_bytes()).await.expect("write request");
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tokio::time::sleep(Duration::from_millis(700)).await;

    let (_, _, body) = send(addr, "GET", "/notificacoes", Some(&worker), None).await;
    assert!(body.contains("#5151"));

    let (status, _, body) = send(addr, "POST", "/solicitacao/enviar", Some(&worker), Some(&submit_form(10))).await;
    assert_eq!(status, 200);
    assert!(!body.contains("Envio em andamento"));
    assert!(body.contains("Solicitação enviada"));
}

#[tokio::test]
async fn gateway_panic_reports_failure_and_allows_retry() {
    let addr = spawn_portal_with(true, Arc::new(FlakyGateway(AtomicBool::new(false)))).await;
    let worker = login(addr, "encarregado@fortes.com", "1234").await;

    let (status, _, body) = send(addr, "POST", "/solicitacao/enviar", Some(&worker), Some(&submit_form(10))).await;
    assert_eq!(status, 200);
    assert!(body.contains("Falha ao enviar"));

    let (_, _, body) = send(addr, "POST", "/solicitacao/enviar", Some(&worker), Some(&submit_form(10))).await;
    assert!(body.contains("<strong>6161</strong>"));
}

#[tokio::test]
async fn requester_keeps_requests_after_email_change() {
    let addr = spawn_portal().await;
    let worker = login(addr, "encarregado@fortes.com", "1234").await;
    send(addr, "POST", "/solicitacao/enviar", Some(&worker), Some(&submit_form(10))).await;
    let (status, _, _) = send(addr, "GET", "/requisicoes/1", Some(&worker), None).await;
    assert_eq!(status, 200);

    let form = "new_email=obra%40fortes.com&confirm_email=obra%40fortes.com&current_password=1234";
    let (_, _, body) = send(addr, "POST", "/perfil", Some(&worker), Some(form)).await;
    assert!(body.contains("Alterações Salvas"));

    let (status, _, body) = send(addr, "GET", "/requisicoes/1", Some(&worker), None).await;
    assert_eq!(status, 200);
    assert!(body.contains("obra@fortes.com"));

    let manager = login(addr, "gestor@fortes.com", "5678").await;
    let (_, _, body) = send(addr, "POST", "/requisicoes/1/aprovar", Some(&manager), Some("comentario=Ok")).await;
    assert!(body.contains("Requisição aprovada com sucesso."));

    let (_, _, body) = send(addr, "GET", "/notificacoes", Some(&worker), None).await;
    assert!(body.contains("Solicitação Aprovada"));
}

#[tokio::test]
async fn native_dialogs_when_rich_dialogs_are_off() {
    let addr = spawn_portal_with(false, Arc::new(InstantGateway(4242))).await;
    let worker = login(addr, "encarregado@fortes.com", "1234").await;
    send(addr, "POST", "/solicitacao/funcionarios/selecionar", Some(&worker), Some("row_1=1")).await;

    let (_, _, body) = send(addr, "POST", "/solicitacao/funcionarios/remover", Some(&worker), Some("row_id=1")).await;
    assert!(body.contains(r#"id="nativeDialogForm""#));
    assert!(body.contains("window.confirm("));
    assert!(body.contains("Tem certeza que deseja excluir este funcionário?"));

    let (status, _, _) = send(addr, "POST", "/solicitacao/funcionarios/remover", Some(&worker), Some("row_id=1&resposta=yes")).await;
    assert_eq!(status, 303);
    let (_, _, json) = send(addr, "GET", "/solicitacao/funcionarios", Some(&worker), None).await;
    assert_eq!(serde_json::from_str::<serde_json::Value>(&json).expect("json"), serde_json::json!([]));

    let (_, _, body) = send(addr, "GET", "/relatorios", Some(&worker), None).await;
    assert!(body.contains("<script>window.alert("));
    assert!(body.contains("window.confirm('Deseja sair do sistema?')"));
}
