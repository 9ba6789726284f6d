use crate::config::TruncationPolicy;
use crate::loan::AmortizationRow;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DisplayRow {
    Period(AmortizationRow),
    /// stands in for the elided middle of a long schedule
    Ellipsis,
}

/// Picks the rows of a schedule worth printing. Short schedules come back
/// whole; long ones keep their head and tail around a single ellipsis.
pub fn truncate_schedule<I>(rows: I, policy: &TruncationPolicy) -> Vec<DisplayRow>
where
    I: ExactSizeIterator<Item = AmortizationRow>,
{
    let total = rows.len() as u32;
    if total <= policy.full_limit {
        return rows.map(DisplayRow::Period).collect();
    }

    let head = policy.head_rows.min(total);
    let tail_start = (head + 1).max((total + 1).saturating_sub(policy.tail_rows));

    let mut shown = Vec::with_capacity((head + policy.tail_rows + 1) as usize);
    for (i, row) in (1..).zip(rows) {
        if i <= head || i >= tail_start {
            shown.push(DisplayRow::Period(row));
        } else if i == head + 1 {
            shown.push(DisplayRow::Ellipsis);
        }
    }
    shown
}
