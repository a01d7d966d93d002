//! Plain-text views for the terminal.

use std::fmt::Write as _;

use velocity_core::{
    AllocationReport, AppState, EvidenceRecord, GanttLayout, SlackState, Task, demo_users,
    minutes_to_hours,
};

const CELL: usize = 6;
const LABEL: usize = 30;

fn money(v: f64) -> String {
    let whole = v.round() as i64;
    let digits = whole.abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if whole < 0 {
        format!("-${out}")
    } else {
        format!("${out}")
    }
}

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        format!("{s:<width$}")
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}~")
    }
}

pub fn status(state: &AppState) -> String {
    let k = state.kpis();
    let mut out = String::new();

    let _ = writeln!(out, "# Capacity\n");
    let _ = writeln!(
        out,
        "Pool: {:.1}h (high {:.1}h, medium {:.1}h, low {:.1}h)",
        k.pool.all, k.pool.high, k.pool.medium, k.pool.low
    );
    let _ = writeln!(out, "Allocated to tasks: {:.1}h\n", k.allocated_hours);

    let _ = writeln!(out, "{:<32} {:<8} {:>8}", "Source", "Conf", "Hours");
    for t in &state.pool.tokens {
        let _ = writeln!(
            out,
            "{} {:<8} {:>8.1}",
            clip(&t.source, 32),
            t.confidence.label(),
            minutes_to_hours(t.minutes)
        );
    }

    if !state.pool.attributions.is_empty() {
        let users = demo_users();
        let _ = writeln!(out, "\nFreed from prior manual owners:");
        for a in &state.pool.attributions {
            let name = users
                .iter()
                .find(|u| u.id == a.person)
                .map_or(a.person.as_str(), |u| u.name.as_str());
            let _ = writeln!(
                out,
                "  - {name}: {:.1}h of {}",
                minutes_to_hours(a.minutes),
                a.source
            );
        }
    }

    let _ = writeln!(out, "\n# Evidence\n");
    let _ = writeln!(out, "Value created: {}", money(k.ledger.value_created));
    let _ = writeln!(out, "Cost avoided:  {}", money(k.ledger.cost_avoided));
    let _ = writeln!(
        out,
        "Tier A {} | Tier B {} | Tier C {} | Total {}",
        money(k.ledger.tier_a),
        money(k.ledger.tier_b),
        money(k.ledger.tier_c),
        money(k.ledger.total)
    );

    if k.rpa.is_some() || k.service.is_some() {
        let _ = writeln!(out, "\n# Harvestable\n");
    }
    if let Some(p) = k.rpa {
        let _ = writeln!(
            out,
            "RPA: {:.1}h freed, {:.1}h contractor at ${}/h = {}{}",
            p.freed_hours,
            p.contractor_hours,
            p.contractor_rate,
            money(p.dollars),
            if p.harvested { " (harvested)" } else { "" }
        );
    }
    if let Some(p) = k.service {
        let _ = writeln!(
            out,
            "Service: {} tickets x ${} = {}{}",
            p.tickets,
            p.cost_per_ticket,
            money(p.dollars),
            if p.harvested { " (harvested)" } else { "" }
        );
    }
    out
}

pub fn allocation(report: &AllocationReport) -> String {
    let mut out = format!(
        "Allocated {:.1}h of {:.1}h to {}",
        minutes_to_hours(report.consumed_minutes),
        minutes_to_hours(report.requested_minutes),
        report.task_id
    );
    if report.shortfall_minutes > 0.0 {
        let _ = write!(
            out,
            " (short {:.1}h)",
            minutes_to_hours(report.shortfall_minutes)
        );
    }
    out.push('\n');
    for d in &report.draws {
        let _ = writeln!(
            out,
            "  - {:.1}h from {} [{}]",
            minutes_to_hours(d.minutes),
            d.source,
            d.confidence.label()
        );
    }
    out
}

fn bar_char(state: SlackState) -> char {
    match state {
        SlackState::Critical => '#',
        SlackState::NearCritical => '+',
        SlackState::OnTrack => '=',
    }
}

pub fn gantt(g: &GanttLayout) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} .. {}\n", g.window_start, g.window_end);

    let mut header = " ".repeat(LABEL);
    for w in 0..g.total_weeks {
        let _ = write!(header, "{:<CELL$}", format!("W{}", w + 1));
    }
    let _ = writeln!(out, "{}", header.trim_end());

    for row in &g.rows {
        let mark = if row.capability { "*" } else { "" };
        let mut line = clip(&format!("{}{} {}", row.task_id, mark, row.name), LABEL - 1);
        line.push(' ');
        for w in 0..g.total_weeks {
            let cell = if w >= row.start_week && w < row.end_week() {
                bar_char(row.state).to_string().repeat(CELL - 1) + " "
            } else {
                " ".repeat(CELL)
            };
            line.push_str(&cell);
        }
        let _ = write!(out, "{}", line.trim_end());
        if row.allocated_hours > 0.0 {
            let _ = write!(out, "  +{:.1}h", row.allocated_hours);
        }
        out.push('\n');
    }

    let mut cap = clip("Freed capacity (h)", LABEL - 1);
    cap.push(' ');
    for hours in &g.weekly_capacity {
        let cell = if *hours > 0.0 {
            format!("{hours:.0}")
        } else {
            ".".to_string()
        };
        let _ = write!(cap, "{cell:<CELL$}");
    }
    let _ = writeln!(out, "\n{}", cap.trim_end());

    if !g.edges.is_empty() {
        let _ = writeln!(out, "\nDependencies:");
        for e in &g.edges {
            let _ = writeln!(out, "  {} -> {}  ({})", e.from, e.to, e.path());
        }
    }
    let _ = writeln!(
        out,
        "\nLegend: # critical  + near-critical  = on track  * capability"
    );
    out
}

pub fn evidence(records: &[EvidenceRecord]) -> String {
    if records.is_empty() {
        return "No evidence recorded yet.\n".to_string();
    }
    let mut out = String::new();
    for r in records {
        let subject = r
            .label
            .as_deref()
            .or(r.task_id.as_deref())
            .unwrap_or("-");
        let _ = writeln!(
            out,
            "[{}] {:>10}  {}  {}",
            r.tier,
            money(r.value),
            clip(subject, 28),
            r.details
        );
    }
    out
}

pub fn tasks(tasks: &[Task]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<30} {:<10} {:<10} {:>6} {:>8} {:>8}  {}",
        "Id", "Name", "Start", "Due", "Slack", "CoD/d", "Alloc h", "Status"
    );
    for t in tasks {
        let mut status = format!("{:?}", t.status).to_lowercase();
        if t.capability {
            status.push_str(", capability");
        }
        if !t.depends_on.is_empty() {
            let _ = write!(status, ", after {}", t.depends_on.join(","));
        }
        let _ = writeln!(
            out,
            "{:<6} {} {:<10} {:<10} {:>6} {:>8} {:>8.1}  {}",
            t.id,
            clip(&t.name, 30),
            t.start,
            t.due,
            t.slack_days,
            money(t.cod_per_day),
            minutes_to_hours(t.allocated_minutes),
            status
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use velocity_core::{DEFAULT_MIN_WEEKS, MintFlags, StandardTimeCatalog};

    fn state() -> AppState {
        AppState::seeded(
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            MintFlags::default(),
            StandardTimeCatalog::default(),
        )
        .unwrap()
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "$0");
        assert_eq!(money(4560.0), "$4,560");
        assert_eq!(money(1_234_567.4), "$1,234,567");
        assert_eq!(money(-2600.0), "-$2,600");
    }

    #[test]
    fn clip_pads_and_truncates() {
        assert_eq!(clip("ab", 4), "ab  ");
        assert_eq!(clip("abcdef", 4), "abc~");
    }

    #[test]
    fn gantt_lists_every_open_task_and_dependency() {
        let s = state();
        let g = s.layout(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(), DEFAULT_MIN_WEEKS);
        let text = gantt(&g);
        for id in ["t1", "t2", "t3", "t4*"] {
            assert!(text.contains(id), "missing {id}");
        }
        assert!(text.contains("t3 -> t4"));
        assert!(text.contains("Freed capacity"));
    }

    #[test]
    fn status_shows_harvestable_sources() {
        let text = status(&state());
        assert!(text.contains("RPA Bot (Block)"));
        assert!(text.contains("$4,560"));
        assert!(text.contains("$2,600"));
    }

    #[test]
    fn status_names_prior_owners() {
        let text = status(&state());
        // 900 triage minutes x 0.6 share
        assert!(text.contains("Sarah: 9.0h of Zap:LeadTriage"));
        assert!(text.contains("Jamal: 3.8h of Zap:LeadTriage"));
    }

    #[test]
    fn empty_ledger_message() {
        assert_eq!(evidence(&[]), "No evidence recorded yet.\n");
    }
}
