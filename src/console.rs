use analytics::util::format_thousands;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use ingest::ValidationWarning;
use report::ResearchReport;

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(Cell::new));
    table
}

/// Prints the per-market and per-region summaries of a finished report.
pub fn print_report_summary(report: &ResearchReport) {
    let meta = &report.research_metadata;
    println!("\n{}", meta.title);
    println!(
        "Report {} | {} providers | {}",
        meta.report_id, meta.providers_analyzed, meta.data_structure
    );

    // --- Sourcing ---
    let sourcing = &report.findings.liquidity_sourcing;
    if !sourcing.findings.is_empty() {
        let mut table = new_table(&["Market", "Type", "Region", "Primary Source", "Total (USD)"]);
        for finding in sourcing.findings.values() {
            table.add_row(vec![
                finding.market_name.clone(),
                finding.provider_type.to_string(),
                finding.region.clone(),
                finding.primary_source.clone().unwrap_or_else(|| "-".to_string()),
                format_thousands(finding.total_liquidity_volume),
            ]);
        }
        println!("\nLiquidity Sourcing\n{table}");
    }

    // --- Efficiency ---
    let efficiency = &report.findings.efficiency_analysis;
    if !efficiency.market_efficiency.is_empty() {
        let mut table = new_table(&[
            "Market",
            "Region",
            "Score",
            "Grade",
            "Success (%)",
            "Turnover (x)",
            "Utilization (%)",
        ]);
        for market in efficiency.market_efficiency.values() {
            let metrics = &market.efficiency_metrics;
            table.add_row(vec![
                market.market_name.clone(),
                market.region.clone(),
                format!("{:.2}", market.efficiency_score.overall_score),
                market.efficiency_score.grade.to_string(),
                format!("{:.1}", metrics.transaction_efficiency.success_rate),
                format!("{:.2}", metrics.float_efficiency.turnover),
                format!("{:.1}", metrics.agent_network_efficiency.utilization_rate),
            ]);
        }
        println!("\nMarket Efficiency\n{table}");
    }

    let disparities = &efficiency.regional_comparison.disparity_analysis;
    if !disparities.is_empty() {
        let mut table = new_table(&["Comparison", "Success Gap", "Agent Gap", "Float Gap", "Overall Gap"]);
        for (pair, gap) in disparities.iter() {
            table.add_row(vec![
                pair.to_string(),
                format!("{:+.1}", gap.success_rate_gap),
                format!("{:+.1}", gap.agent_health_gap),
                format!("{:+.2}", gap.float_efficiency_gap),
                format!("{:+.1}", gap.overall_efficiency_gap),
            ]);
        }
        println!("\nRegional Disparities\n{table}");
    }

    if !efficiency.onchain_efficiency.is_empty() {
        let mut table = new_table(&["Provider", "Score", "TVL (M)", "Volume (M)", "APY (%)", "Transfers (K)"]);
        for provider in efficiency.onchain_efficiency.values() {
            let m = &provider.efficiency_metrics;
            table.add_row(vec![
                provider.market_name.clone(),
                format!("{:.2}", provider.efficiency_score),
                format!("{:.2}", m.tvl_efficiency),
                format!("{:.2}", m.volume_efficiency),
                format!("{:.2}", m.yield_efficiency),
                format!("{:.1}", m.cross_chain_efficiency),
            ]);
        }
        println!("\nOnchain Efficiency\n{table}");
    }
}

/// Prints advisory validation warnings, or a one-line all-clear.
pub fn print_warnings(warnings: &[ValidationWarning]) {
    if warnings.is_empty() {
        println!("No validation warnings.");
        return;
    }
    let mut table = new_table(&["Provider", "Category", "Detail"]);
    for warning in warnings {
        table.add_row(vec![
            warning.provider().to_string(),
            warning.category().to_string(),
            warning.to_string(),
        ]);
    }
    println!("\n{} validation warning(s)\n{table}", warnings.len());
}
