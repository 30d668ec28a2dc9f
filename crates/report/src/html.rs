use crate::model::ResearchReport;
use analytics::Insight;
use analytics::util::format_thousands;

const STYLES: &str = "<style>\
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Helvetica,Arial,sans-serif;color:#1f2937;margin:24px;}\
h2{margin-top:28px;border-bottom:1px solid #e5e7eb;padding-bottom:6px;}\
h3{margin-top:18px;color:#374151;}\
.small{color:#6b7280;font-size:0.9em;}\
.table{border-collapse:collapse;width:100%;margin:8px 0 16px 0;}\
.table th,.table td{padding:8px 10px;border-bottom:1px solid #eee;text-align:left;}\
.note{background:#f9fafb;border:1px solid #e5e7eb;padding:10px 12px;border-radius:8px;margin:8px 0;}\
</style>";

/// Renders a self-contained HTML page for a report. Every interpolated string is escaped.
pub fn render_html(report: &ResearchReport) -> String {
    let meta = &report.research_metadata;
    let sourcing = &report.findings.liquidity_sourcing;
    let efficiency = &report.findings.efficiency_analysis;

    let mut html = String::new();
    html.push_str("<!DOCTYPE html><html><head><meta charset='utf-8'>");
    html.push_str(&format!("<title>{}</title>", escape_html(&meta.title)));
    html.push_str(STYLES);
    html.push_str("</head><body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&meta.title)));
    html.push_str(&format!(
        "<div class='small'>Generated: {} · Methodology v{} · Providers analyzed: {}</div>\n",
        meta.analysis_timestamp.to_rfc3339(),
        escape_html(&meta.methodology_version),
        meta.providers_analyzed
    ));

    // --- 1. Sourcing by market ---
    html.push_str("<h2>1. Liquidity Sourcing (by Market)</h2>\n");
    let rows: Vec<Vec<String>> = sourcing
        .findings
        .values()
        .map(|f| {
            vec![
                escape_html(&f.market_name),
                escape_html(&f.region),
                escape_html(f.primary_source.as_deref().unwrap_or("-")),
                format_thousands(f.total_liquidity_volume),
            ]
        })
        .collect();
    push_table(
        &mut html,
        &["Market", "Region", "Primary Source", "Total Liquidity (USD)"],
        &rows,
        "No liquidity sourcing data.",
    );

    html.push_str("<h3>Source Distribution</h3>\n");
    let mut any_distribution = false;
    for finding in sourcing.findings.values() {
        if finding.source_distribution.is_empty() {
            continue;
        }
        any_distribution = true;
        html.push_str(&format!("<h3>{}</h3>\n", escape_html(&finding.market_name)));
        let rows: Vec<Vec<String>> = finding
            .source_distribution
            .iter()
            .map(|(source, share)| {
                vec![
                    escape_html(source),
                    format_thousands(share.volume),
                    format!("{:.2}", share.percentage),
                ]
            })
            .collect();
        push_table(&mut html, &["Source", "Volume (USD)", "Share (%)"], &rows, "");
    }
    if !any_distribution {
        push_para(&mut html, "No source distribution available.");
    }

    // --- 2. Regional sourcing ---
    html.push_str("<h2>2. Regional Liquidity Sourcing Patterns</h2>\n");
    let rows: Vec<Vec<String>> = sourcing
        .regional_patterns
        .iter()
        .map(|(region, p)| {
            vec![
                escape_html(region),
                p.market_count.to_string(),
                format_thousands(p.total_volume),
                format_thousands(p.avg_volume_per_market),
                escape_html(&p.common_sources.join(", ")),
            ]
        })
        .collect();
    push_table(
        &mut html,
        &[
            "Region",
            "Markets",
            "Total Liquidity (USD)",
            "Avg Liquidity / Market (USD)",
            "Common Sources",
        ],
        &rows,
        "No regional sourcing data.",
    );

    // --- 3. Efficiency by market ---
    html.push_str("<h2>3. Liquidity Efficiency (by Market)</h2>\n");
    let rows: Vec<Vec<String>> = efficiency
        .market_efficiency
        .values()
        .map(|m| {
            let metrics = &m.efficiency_metrics;
            vec![
                escape_html(&m.market_name),
                escape_html(&m.region),
                format!("{:.1}", m.efficiency_score.overall_score),
                m.efficiency_score.grade.to_string(),
                format!("{:.1}", metrics.transaction_efficiency.success_rate),
                format!("{:.1}", metrics.float_efficiency.turnover),
                format!("{:.1}", metrics.agent_network_efficiency.utilization_rate),
            ]
        })
        .collect();
    push_table(
        &mut html,
        &[
            "Market",
            "Region",
            "Overall Score",
            "Grade",
            "Success Rate (%)",
            "Float Turnover (x)",
            "Agent Utilization (%)",
        ],
        &rows,
        "No efficiency data.",
    );

    html.push_str("<h3>Agent-Level Frictions (Counts)</h3>\n");
    if efficiency.market_efficiency.is_empty() {
        push_para(&mut html, "No friction data.");
    }
    for market in efficiency.market_efficiency.values() {
        let points = &market.friction_analysis.friction_points;
        html.push_str(&format!("<h3>{}</h3>\n", escape_html(&market.market_name)));
        let rows = vec![
            vec![
                "Agents lacking e-float".to_string(),
                format!("{:.0}", points.low_liquidity_agents),
            ],
            vec![
                "Agents lacking cash".to_string(),
                format!("{:.0}", points.low_cash_agents),
            ],
            vec![
                "Inactive agents".to_string(),
                format!("{:.0}", points.inactive_agents),
            ],
        ];
        push_table(&mut html, &["Friction", "Count"], &rows, "");
    }

    // --- 4. Regional disparities ---
    html.push_str("<h2>4. Regional Efficiency Disparities</h2>\n");
    let rows: Vec<Vec<String>> = efficiency
        .regional_comparison
        .disparity_analysis
        .iter()
        .map(|(pair, d)| {
            vec![
                escape_html(pair),
                format!("{:.1}", d.success_rate_gap),
                format!("{:.1}", d.agent_health_gap),
                format!("{:.1}", d.float_efficiency_gap),
                format!("{:.1}", d.overall_efficiency_gap),
            ]
        })
        .collect();
    push_table(
        &mut html,
        &[
            "Comparison",
            "Success Rate Gap (pp)",
            "Agent Health Gap (pp)",
            "Float Efficiency Gap (x)",
            "Overall Efficiency Gap",
        ],
        &rows,
        "No regional disparity data.",
    );

    // --- 5. Insights ---
    html.push_str("<h2>5. Key Insights</h2>\n");
    let insights = &efficiency.efficiency_insights;
    let mut notes = insights
        .key_findings
        .iter()
        .chain(&insights.regional_patterns)
        .peekable();
    if notes.peek().is_none() {
        push_para(&mut html, "No insights generated.");
    }
    for insight in notes {
        push_note(&mut html, insight);
    }

    html.push_str("<h3>Onchain Efficiency</h3>\n");
    let rows: Vec<Vec<String>> = efficiency
        .onchain_efficiency
        .values()
        .map(|o| {
            let m = &o.efficiency_metrics;
            vec![
                escape_html(&o.market_name),
                format!("{:.2}", o.efficiency_score),
                format!("{:.2}", m.tvl_efficiency),
                format!("{:.2}", m.volume_efficiency),
                format!("{:.2}", m.yield_efficiency),
                format!("{:.1}", m.cross_chain_efficiency),
            ]
        })
        .collect();
    push_table(
        &mut html,
        &[
            "Provider",
            "Score",
            "TVL (USD M)",
            "Daily Volume (USD M)",
            "APY (%)",
            "Cross-chain Transfers (K)",
        ],
        &rows,
        "No onchain efficiency data.",
    );
    for insight in report.findings.onchain_analysis.onchain_insights.all() {
        push_note(&mut html, insight);
    }

    html.push_str(&format!(
        "<div class='small'>Report {}</div>\n",
        meta.report_id
    ));
    html.push_str("</body></html>\n");
    html
}

/// Writes a table, or the `empty` paragraph when there are no rows.
/// Cells must already be escaped.
fn push_table(html: &mut String, headers: &[&str], rows: &[Vec<String>], empty: &str) {
    if rows.is_empty() {
        if !empty.is_empty() {
            push_para(html, empty);
        }
        return;
    }
    html.push_str("<table class='table'><tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{cell}</td>"));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
}

fn push_para(html: &mut String, text: &str) {
    html.push_str(&format!("<p>{}</p>\n", escape_html(text)));
}

fn push_note(html: &mut String, insight: &Insight) {
    html.push_str(&format!(
        "<div class='note'><strong>{}</strong><br/>Evidence: {}<br/>Implication: {}</div>\n",
        escape_html(&insight.headline),
        escape_html(&insight.evidence),
        escape_html(&insight.implication)
    ));
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ReportAssembler;
    use configuration::Config;
    use core_types::{OffchainMetrics, Provider, ProviderMetrics};

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"A&B's"</b>"#),
            "&lt;b&gt;&quot;A&amp;B&#x27;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_empty_report_has_placeholders() {
        let report = ReportAssembler::new(Config::default()).assemble(&[]);
        let html = render_html(&report);
        for placeholder in [
            "No liquidity sourcing data.",
            "No source distribution available.",
            "No regional sourcing data.",
            "No efficiency data.",
            "No friction data.",
            "No regional disparity data.",
            "No insights generated.",
            "No onchain efficiency data.",
        ] {
            assert!(html.contains(placeholder), "missing {placeholder}");
        }
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_market_names_are_escaped() {
        let provider = Provider {
            name: "<script>alert(1)</script>".to_string(),
            metrics: ProviderMetrics::Offchain(OffchainMetrics {
                region: Some("East & Central".to_string()),
                liquidity_sources: vec!["banks".to_string()],
                liquidity_volumes: [("banks".to_string(), 1_234_567.0)].into_iter().collect(),
                ..Default::default()
            }),
        };
        let report = ReportAssembler::new(Config::default()).assemble(&[provider]);
        let html = render_html(&report);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("East &amp; Central"));
        assert!(html.contains("1,234,567"));
    }
}
