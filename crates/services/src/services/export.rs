//! CSV and print-ready HTML rendering for dashboard listings.
//!
//! Each builder turns already filtered records into an [`ExportTable`]; the
//! table is then rendered as CSV or wrapped in a [`PrintReport`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use db::models::{
    caretaker::Caretaker, financial_report::FinancialReport, monitoring_record::MonitoringRecord,
    pig::Pig,
};
use utils::text::{csv_row, escape_html};
use uuid::Uuid;

use super::{
    financial::AssociationFinancialSummary,
    performance::{CaretakerRating, RatingsSummary, UNKNOWN_ASSOCIATION},
};

pub const RATING_HEADERS: &[&str] = &[
    "Caretaker",
    "Association",
    "Status",
    "Pigs",
    "Health Rate",
    "Breeding Rate",
    "Punctuality",
    "Communication",
    "Patient Care",
    "Professionalism",
    "Technical Skills",
    "Weighted Average",
    "Plus Factor",
    "Overall Score",
    "Rating",
];

pub const CARETAKER_HEADERS: &[&str] = &[
    "Name",
    "Barangay",
    "Municipality",
    "Province",
    "Contact Number",
    "Association",
    "Status",
    "Modality",
    "Participant Type",
];

pub const PIG_HEADERS: &[&str] = &[
    "ID",
    "Caretaker",
    "Health Status",
    "Breeding Status",
    "Weight (kg)",
    "Sex",
    "Breed",
    "Date of Birth",
];

pub const FINANCIAL_HEADERS: &[&str] = &[
    "Association",
    "Reporting Period",
    "Total Sales",
    "Production Cost",
    "Operating Expenses",
    "Gross Profit",
    "Net Profit",
    "Caretaker Share",
    "Association Share",
    "Profit Margin (%)",
];

pub const MONITORING_HEADERS: &[&str] = &[
    "ID",
    "Project ID",
    "Association IDs",
    "Monitoring Date",
    "Type",
    "Status",
    "Gross Sales",
    "Net Income",
    "Monitored By",
    "Remarks",
];

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn percent(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}

/// Header plus stringified rows, ready for either output format
#[derive(Debug, Clone)]
pub struct ExportTable {
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn to_csv(&self) -> String {
        std::iter::once(csv_row(self.headers))
            .chain(self.rows.iter().map(csv_row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn to_html(&self) -> String {
        let mut html = String::from("<table>\n<thead><tr>");
        for header in self.headers {
            html.push_str(&format!("<th>{}</th>", escape_html(header)));
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        if self.rows.is_empty() {
            html.push_str(&format!(
                "<tr><td colspan=\"{}\" class=\"empty\">No records</td></tr>\n",
                self.headers.len()
            ));
        }
        for row in &self.rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }
}

pub fn ratings_table(ratings: &[CaretakerRating]) -> ExportTable {
    let rows = ratings
        .iter()
        .map(|r| {
            let b = &r.rating;
            vec![
                r.caretaker_name.clone(),
                r.association_name.clone(),
                r.status.to_string(),
                b.metrics.pig_count.to_string(),
                percent(b.metrics.health_rate),
                percent(b.metrics.breeding_rate),
                money(b.scores.punctuality),
                money(b.scores.communication),
                money(b.scores.patient_care),
                money(b.scores.professionalism),
                money(b.scores.technical_skills),
                money(b.weighted_average),
                money(b.plus_factor),
                money(b.overall_score),
                b.descriptive_rating.to_string(),
            ]
        })
        .collect();
    ExportTable {
        headers: RATING_HEADERS,
        rows,
    }
}

pub fn caretakers_table(
    caretakers: &[Caretaker],
    association_names: &HashMap<Uuid, String>,
) -> ExportTable {
    let rows = caretakers
        .iter()
        .map(|c| {
            let association = c
                .slp_association
                .and_then(|id| association_names.get(&id))
                .map(String::as_str)
                .unwrap_or(UNKNOWN_ASSOCIATION);
            vec![
                c.full_name(),
                c.barangay.clone(),
                c.municipality.clone(),
                c.province.clone(),
                c.contact_number.clone().unwrap_or_default(),
                association.to_string(),
                c.status.to_string(),
                c.modality.clone(),
                c.participant_type.clone(),
            ]
        })
        .collect();
    ExportTable {
        headers: CARETAKER_HEADERS,
        rows,
    }
}

pub fn pigs_table(pigs: &[Pig]) -> ExportTable {
    let rows = pigs
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.caretaker_name.clone(),
                p.health_status.to_string(),
                p.breeding_status.to_string(),
                money(p.weight),
                p.sex.map(|s| s.to_string()).unwrap_or_default(),
                p.breed.clone().unwrap_or_default(),
                p.date_of_birth.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    ExportTable {
        headers: PIG_HEADERS,
        rows,
    }
}

pub fn financial_reports_table(
    reports: &[FinancialReport],
    association_names: &HashMap<Uuid, String>,
) -> ExportTable {
    let rows = reports
        .iter()
        .map(|r| {
            vec![
                association_names
                    .get(&r.association_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_ASSOCIATION.to_string()),
                r.reporting_period.clone(),
                money(r.total_sales),
                money(r.production_cost),
                money(r.operating_expenses),
                money(r.gross_profit),
                money(r.net_profit),
                money(r.caretaker_share),
                money(r.association_share),
                money(r.profit_margin),
            ]
        })
        .collect();
    ExportTable {
        headers: FINANCIAL_HEADERS,
        rows,
    }
}

pub fn monitoring_table(records: &[MonitoringRecord]) -> ExportTable {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.project_id.to_string(),
                r.association_ids
                    .iter()
                    .map(Uuid::to_string)
                    .collect::<Vec<_>>()
                    .join(";"),
                r.monitoring_date.to_string(),
                r.monitoring_type.to_string(),
                r.status.to_string(),
                money(r.gross_sales),
                money(r.net_income),
                r.monitored_by.clone().unwrap_or_default(),
                r.remarks.clone().unwrap_or_default(),
            ]
        })
        .collect();
    ExportTable {
        headers: MONITORING_HEADERS,
        rows,
    }
}

/// A standalone printable document: title, timestamp, summary block and table
#[derive(Debug, Clone)]
pub struct PrintReport {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub summary: Vec<(String, String)>,
    pub table: ExportTable,
}

const PRINT_STYLES: &str = "body{font-family:Arial,Helvetica,sans-serif;margin:24px;color:#1f2937}\
h1{font-size:20px;margin-bottom:4px}\
.generated{color:#6b7280;font-size:12px;margin-bottom:16px}\
.summary{display:flex;flex-wrap:wrap;gap:12px;margin-bottom:16px}\
.summary div{border:1px solid #d1d5db;border-radius:4px;padding:8px 12px}\
.summary span{display:block;font-size:11px;color:#6b7280}\
table{border-collapse:collapse;width:100%;font-size:11px}\
th,td{border:1px solid #d1d5db;padding:4px 6px;text-align:left}\
th{background:#f3f4f6}\
td.empty{text-align:center;color:#6b7280}\
@media print{body{margin:0}}";

impl PrintReport {
    pub fn render(&self) -> String {
        let title = escape_html(&self.title);
        let mut summary = String::new();
        for (label, value) in &self.summary {
            summary.push_str(&format!(
                "<div><span>{}</span>{}</div>",
                escape_html(label),
                escape_html(value)
            ));
        }
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
             <title>{title}</title>\n<style>{PRINT_STYLES}</style>\n</head>\n<body>\n\
             <h1>{title}</h1>\n<div class=\"generated\">Generated {generated}</div>\n\
             <div class=\"summary\">{summary}</div>\n{table}\n</body>\n</html>\n",
            generated = self.generated_at.format("%Y-%m-%d %H:%M UTC"),
            table = self.table.to_html(),
        )
    }
}

pub fn ratings_report(
    ratings: &[CaretakerRating],
    summary: &RatingsSummary,
    generated_at: DateTime<Utc>,
) -> PrintReport {
    let mut items = vec![
        (
            "Caretakers".to_string(),
            summary.total_caretakers.to_string(),
        ),
        ("Average Score".to_string(), money(summary.average_score)),
    ];
    items.extend(
        summary
            .distribution
            .iter()
            .map(|c| (c.rating.to_string(), c.count.to_string())),
    );
    PrintReport {
        title: "Caretaker Performance Ratings".to_string(),
        generated_at,
        summary: items,
        table: ratings_table(ratings),
    }
}

pub fn financial_report(
    reports: &[FinancialReport],
    totals: &[AssociationFinancialSummary],
    association_names: &HashMap<Uuid, String>,
    generated_at: DateTime<Utc>,
) -> PrintReport {
    let sum = |f: fn(&AssociationFinancialSummary) -> f64| totals.iter().map(f).sum::<f64>();
    PrintReport {
        title: "Association Financial Reports".to_string(),
        generated_at,
        summary: vec![
            ("Reports".to_string(), reports.len().to_string()),
            ("Total Sales".to_string(), money(sum(|t| t.total_sales))),
            (
                "Total Net Profit".to_string(),
                money(sum(|t| t.total_net_profit)),
            ),
            (
                "Caretaker Shares".to_string(),
                money(sum(|t| t.total_caretaker_share)),
            ),
            (
                "Association Shares".to_string(),
                money(sum(|t| t.total_association_share)),
            ),
        ],
        table: financial_reports_table(reports, association_names),
    }
}
