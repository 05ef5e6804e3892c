//! Report service - savings totals and monthly summaries
//!
//! Also renders the printable monthly statement as HTML. Turning that HTML
//! into a PDF is left to whatever renderer the caller plugs in.

use std::fmt::Write;
use std::sync::Arc;

use crate::domain::report::month_name;
use crate::domain::result::{Error, Result};
use crate::domain::{MonthlyReport, SavingsTotal, Transaction, User};
use crate::ports::Repository;

pub struct ReportService {
    repository: Arc<dyn Repository>,
}

impl ReportService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Sum of all the user's savings, 0 when there are none
    pub async fn total_savings(&self, user: &User) -> Result<i64> {
        self.repository.total_savings(user.id).await
    }

    pub async fn savings_total(&self, user: &User) -> Result<SavingsTotal> {
        Ok(SavingsTotal {
            user: user.username.clone(),
            savings: self.total_savings(user).await?,
        })
    }

    /// Income, expense, net and per-category expenses for a month of any year
    pub async fn monthly_report(&self, user: &User, month: u32) -> Result<MonthlyReport> {
        Ok(self.monthly_statement(user, month).await?.0)
    }

    /// The monthly report plus the transactions it was built from
    pub async fn monthly_statement(
        &self,
        user: &User,
        month: u32,
    ) -> Result<(MonthlyReport, Vec<Transaction>)> {
        month_name(month)?;

        let transactions = self
            .repository
            .get_transactions_for_month(user.id, month)
            .await?;
        let total_savings = self.total_savings(user).await?;
        let report = MonthlyReport::build(&user.username, month, &transactions, total_savings)?;

        Ok((report, transactions))
    }

    /// Printable HTML statement for a month
    pub async fn monthly_statement_html(&self, user: &User, month: u32) -> Result<String> {
        let (report, transactions) = self.monthly_statement(user, month).await?;
        render_html(&report, &transactions)
    }
}

/// Render a report and its transactions as a standalone HTML document
pub fn render_html(report: &MonthlyReport, transactions: &[Transaction]) -> Result<String> {
    render(report, transactions).map_err(|e| Error::Other(format!("Failed to render report: {}", e)))
}

fn render(report: &MonthlyReport, transactions: &[Transaction]) -> std::result::Result<String, std::fmt::Error> {
    let mut html = String::new();

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html>")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\">")?;
    writeln!(
        html,
        "<title>Monthly Report - {} - {}</title>",
        escape_html(&report.user),
        report.month_name
    )?;
    writeln!(html, "<style>")?;
    writeln!(html, "body {{ font-family: Arial, sans-serif; margin: 30px; }}")?;
    writeln!(html, "h2 {{ text-align: center; color: #2c3e50; }}")?;
    writeln!(html, "table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}")?;
    writeln!(html, "th, td {{ border: 1px solid #ccc; padding: 8px 12px; text-align: left; }}")?;
    writeln!(html, "th {{ background-color: #f5f5f5; }}")?;
    writeln!(html, "tr:nth-child(even) {{ background-color: #f9f9f9; }}")?;
    writeln!(html, ".summary {{ margin-top: 30px; font-weight: bold; }}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(
        html,
        "<h2>Monthly Report for {} - {}</h2>",
        escape_html(&report.user),
        report.month_name
    )?;

    writeln!(html, "<table>")?;
    writeln!(
        html,
        "<thead><tr><th>Date</th><th>Title</th><th>Type</th><th>Amount</th><th>Category</th><th>Notes</th></tr></thead>"
    )?;
    writeln!(html, "<tbody>")?;
    for tx in transactions {
        writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            tx.date_added,
            escape_html(&tx.title),
            tx.kind,
            tx.amount,
            escape_html(tx.category_name()),
            escape_html(tx.optional_notes.as_deref().unwrap_or(""))
        )?;
    }
    writeln!(html, "</tbody>")?;
    writeln!(html, "</table>")?;

    if !report.categories.is_empty() {
        writeln!(html, "<table>")?;
        writeln!(html, "<thead><tr><th>Category</th><th>Expense</th></tr></thead>")?;
        writeln!(html, "<tbody>")?;
        for (name, amount) in &report.categories {
            writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape_html(name), amount)?;
        }
        writeln!(html, "</tbody>")?;
        writeln!(html, "</table>")?;
    }

    writeln!(html, "<div class=\"summary\">")?;
    writeln!(html, "<p>Income: {}</p>", report.income)?;
    writeln!(html, "<p>Expense: {}</p>", report.expense)?;
    writeln!(html, "<p>Net: {}</p>", report.net)?;
    writeln!(html, "<p>Total savings: {}</p>", report.total_savings)?;
    writeln!(html, "</div>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;

    Ok(html)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryInfo, TransactionType};
    use chrono::NaiveDate;

    fn sample() -> (MonthlyReport, Vec<Transaction>) {
        let transactions = vec![
            Transaction {
                id: 1,
                title: "Salary".to_string(),
                amount: 100,
                kind: TransactionType::Income,
                category: None,
                date_added: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                optional_notes: None,
                user_id: 1,
            },
            Transaction {
                id: 2,
                title: "Fish & <Chips>".to_string(),
                amount: 40,
                kind: TransactionType::Expense,
                category: Some(CategoryInfo {
                    id: 3,
                    name: "Food".to_string(),
                }),
                date_added: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                optional_notes: Some("friday".to_string()),
                user_id: 1,
            },
        ];
        let report = MonthlyReport::build("alice", 6, &transactions, 10).unwrap();
        (report, transactions)
    }

    #[test]
    fn test_render_lists_every_transaction() {
        let (report, transactions) = sample();
        let html = render_html(&report, &transactions).unwrap();

        assert!(html.contains("Monthly Report for alice - June"));
        assert!(html.contains("<td>Salary</td>"));
        assert!(html.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(html.contains("<td>Food</td><td>40</td>"));
        assert!(html.contains("<p>Net: 60</p>"));
        assert!(html.contains("<p>Total savings: 10</p>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }
}
