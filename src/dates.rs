// src/dates.rs

//! # Verificação de antecedência das datas
//!
//! Uma solicitação de horas extras só pode ser feita com pelo menos
//! [`MIN_LEAD_DAYS`] dias de antecedência.

use chrono::{Local, NaiveDate};

/// Antecedência mínima, em dias, exigida para uma solicitação.
pub const MIN_LEAD_DAYS: i64 = 3;

/// Converte uma data `AAAA-MM-DD` (o formato do `<input type="date">`).
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let mut parts = raw.split('-');
    let (y, m, d) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let y: i32 = y.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    let d: u32 = d.parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Número de dias de calendário entre `today` e a data informada.
///
/// Devolve `None` quando a data está vazia ou não pode ser interpretada;
/// quem chama deve tratar esse caso como "infinitamente no futuro".
pub fn days_until(raw: Option<&str>, today: NaiveDate) -> Option<i64> {
    let selected = parse_iso_date(raw?)?;
    Some(lead_days(selected, today))
}

/// Diferença em dias de calendário entre duas datas já interpretadas.
pub fn lead_days(selected: NaiveDate, today: NaiveDate) -> i64 {
    (selected - today).num_days()
}

/// `true` se a data respeita a antecedência mínima.
///
/// Uma data ausente ou inválida passa no teste; a presença
/// da data é exigida à parte pela validação do formulário.
pub fn is_date_allowed(raw: Option<&str>, today: NaiveDate) -> bool {
    days_until(raw, today).map_or(true, |days| days >= MIN_LEAD_DAYS)
}

/// Atalho que usa o relógio local como "hoje".
pub fn is_date_allowed_today(raw: Option<&str>) -> bool {
    is_date_allowed(raw, Local::now().date_naive())
}

/// Data de hoje no formato usado nas notificações (`dd/mm/aaaa`).
pub fn today_display() -> String {
    Local::now().date_naive().format("%d/%m/%Y").to_string()
}
