//! Report aggregation - pure functions from records to tabular data.
//!
//! Each builder takes already-loaded producers/collections plus the user
//! profile and returns a [`Sheet`] for the spreadsheet writer. Nothing
//! here touches storage or files. Labels, date formats, and month names
//! stay in Portuguese to keep exported files identical to the ones the
//! app has always produced.

use crate::{
    errors::{Error, Result},
    models::{MilkCollection, Producer, UserProfile},
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Tabular export data: preamble lines, one column-header row, data rows.
/// An empty row renders as a blank separator line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// Title lines printed above the table (reference period, identity)
    pub preamble: Vec<String>,
    /// Column header row
    pub columns: Vec<String>,
    /// Data rows, including any trailing total rows
    pub rows: Vec<Vec<String>>,
}

const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Portuguese month name for a 1-based month number.
#[must_use]
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[(month.saturating_sub(1) as usize) % 12]
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn reference_label(reference: DateTime<Utc>) -> String {
    format!(
        "Mês de referência: {} de {}",
        month_name(reference.month()),
        reference.year()
    )
}

fn period_label(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    if start.month() == end.month() && start.year() == end.year() {
        format!("{} de {}", month_name(start.month()), start.year())
    } else {
        format!(
            "{}/{} a {}/{}",
            month_name(start.month()),
            start.year(),
            month_name(end.month()),
            end.year()
        )
    }
}

/// Quantities print the way they were entered: whole liters without a
/// decimal point, fractional ones as-is.
fn format_quantity(quantity: f64) -> String {
    format!("{quantity}")
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

/// Per-producer detail: one row per collection, then a total-value row.
///
/// Row values are recomputed from the producer's *current* price per
/// liter, not from the stored `total_price` - this matches the historical
/// export files even when the price changed after a collection was saved.
///
/// # Errors
/// [`Error::NothingToExport`] when the producer has no collections.
pub fn producer_statement(
    producer: &Producer,
    collections: &[MilkCollection],
    profile: &UserProfile,
    reference: DateTime<Utc>,
) -> Result<Sheet> {
    let own: Vec<&MilkCollection> = collections
        .iter()
        .filter(|collection| collection.producer_id == producer.id)
        .collect();

    if own.is_empty() {
        return Err(Error::NothingToExport {
            context: format!("no collections recorded for producer {}", producer.name),
        });
    }

    let mut rows = Vec::with_capacity(own.len() + 2);
    let mut total_value = 0.0;

    for collection in &own {
        let value = collection.quantity * producer.price_per_liter;
        total_value += value;

        let issues: Vec<&str> = collection
            .issues
            .iter()
            .map(|issue| issue.name.as_str())
            .collect();

        rows.push(vec![
            format_quantity(collection.quantity),
            format!("{value:.2}"),
            issues.join(", "),
            collection.notes.clone().unwrap_or_default(),
            format_date(collection.date.date_naive()),
        ]);
    }

    rows.push(Vec::new());
    rows.push(vec![
        "VALOR TOTAL:".to_string(),
        String::new(),
        format!("{total_value:.2}"),
        String::new(),
        String::new(),
    ]);

    Ok(Sheet {
        preamble: vec![
            reference_label(reference),
            format!("Produtor: {}", producer.name),
            format!("Inscrição estadual: {}", profile.state_registration),
        ],
        columns: ["QUANTIDADE", "VALOR TOTAL", "PROBLEMAS", "OBSERVAÇÃO", "DATA"]
            .map(String::from)
            .to_vec(),
        rows,
    })
}

/// Day-by-day matrix: one row per distinct collection date (ascending),
/// one quantity column per active producer, plus unioned problem and
/// note columns for the whole day.
#[must_use]
pub fn date_matrix(
    producers: &[Producer],
    collections: &[MilkCollection],
    profile: &UserProfile,
    reference: DateTime<Utc>,
) -> Sheet {
    let active: Vec<&Producer> = producers.iter().filter(|p| p.active).collect();

    let mut by_date: BTreeMap<NaiveDate, Vec<&MilkCollection>> = BTreeMap::new();
    for collection in collections {
        by_date
            .entry(collection.date.date_naive())
            .or_default()
            .push(collection);
    }

    let mut columns = Vec::with_capacity(active.len() + 3);
    columns.push("DATA".to_string());
    columns.push("PROBLEMAS".to_string());
    for producer in &active {
        columns.push(producer.name.clone());
    }
    columns.push("OBSERVAÇÕES".to_string());

    let mut rows = Vec::with_capacity(by_date.len());
    for (date, day) in &by_date {
        let mut issues: Vec<String> = Vec::new();
        let mut notes: Vec<String> = Vec::new();
        for collection in day {
            for issue in &collection.issues {
                push_unique(&mut issues, &issue.name);
            }
            if let Some(note) = &collection.notes {
                push_unique(&mut notes, note);
            }
        }

        let mut row = Vec::with_capacity(columns.len());
        row.push(format_date(*date));
        row.push(issues.join(", "));

        for producer in &active {
            let quantity: f64 = day
                .iter()
                .filter(|c| c.producer_id == producer.id)
                .map(|c| c.quantity)
                .sum();
            row.push(if quantity > 0.0 {
                format_quantity(quantity)
            } else {
                String::new()
            });
        }

        row.push(notes.join(" | "));
        rows.push(row);
    }

    Sheet {
        preamble: vec![
            reference_label(reference),
            format!("Produtor: {}", profile.name),
            format!("Inscrição estadual: {}", profile.state_registration),
        ],
        columns,
        rows,
    }
}

/// Period summary: one row per distinct date inside `[start, end]` with
/// total quantity, total value, and the day's issue union, then a
/// grand-total row. Values use each contributing producer's current
/// price, like [`producer_statement`].
///
/// # Errors
/// [`Error::NothingToExport`] when no collection falls inside the range.
pub fn period_summary(
    producers: &[Producer],
    collections: &[MilkCollection],
    profile: &UserProfile,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Sheet> {
    let in_range: Vec<&MilkCollection> = collections
        .iter()
        .filter(|c| c.date >= start && c.date <= end)
        .collect();

    if in_range.is_empty() {
        return Err(Error::NothingToExport {
            context: "no collections recorded in the selected period".to_string(),
        });
    }

    #[derive(Default)]
    struct DayTotals {
        quantity: f64,
        value: f64,
        issues: Vec<String>,
    }

    let mut by_date: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
    for collection in in_range {
        let day = by_date.entry(collection.date.date_naive()).or_default();

        day.quantity += collection.quantity;
        for issue in &collection.issues {
            push_unique(&mut day.issues, &issue.name);
        }
        // A collection whose producer record is gone still counts toward
        // quantity, it just contributes no value.
        if let Some(producer) = producers.iter().find(|p| p.id == collection.producer_id) {
            day.value += collection.quantity * producer.price_per_liter;
        }
    }

    let mut rows = Vec::with_capacity(by_date.len() + 2);
    let mut grand_quantity = 0.0;
    let mut grand_value = 0.0;

    for (date, day) in &by_date {
        grand_quantity += day.quantity;
        grand_value += day.value;
        rows.push(vec![
            format_date(*date),
            format!("{:.1}", day.quantity),
            format!("{:.2}", day.value),
            day.issues.join(", "),
        ]);
    }

    rows.push(Vec::new());
    rows.push(vec![
        "TOTAL GERAL:".to_string(),
        format!("{grand_quantity:.1}"),
        format!("{grand_value:.2}"),
        String::new(),
    ]);

    Ok(Sheet {
        preamble: vec![
            format!("Período de referência: {}", period_label(start, end)),
            format!("Produtor: {}", profile.name),
            format!("Inscrição estadual: {}", profile.state_registration),
        ],
        columns: ["DATA", "QUANTIDADE TOTAL", "VALOR TOTAL", "PROBLEMAS"]
            .map(String::from)
            .to_vec(),
        rows,
    })
}

/// Flat producer roster, one row per producer (active or not).
#[must_use]
pub fn producer_roster(producers: &[Producer]) -> Sheet {
    let rows = producers
        .iter()
        .map(|producer| {
            vec![
                producer.name.clone(),
                producer.address.clone().unwrap_or_default(),
                producer.phone.clone().unwrap_or_default(),
                format!("{:.2}", producer.price_per_liter),
                if producer.active { "Sim" } else { "Não" }.to_string(),
                producer.notes.clone().unwrap_or_default(),
            ]
        })
        .collect();

    Sheet {
        preamble: Vec::new(),
        columns: [
            "Nome",
            "Endereço",
            "Telefone",
            "Preço/Litro (R$)",
            "Ativo",
            "Observações",
        ]
        .map(String::from)
        .to_vec(),
        rows,
    }
}
