//! Grouping of daybook entries into days with totals.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{daybook::DaybookEntry, transaction_type::TransactionType};

/// Income and expense totals with their difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DaybookTotals {
    pub income: f64,
    pub expense: f64,
    /// `income - expense`.
    pub net: f64,
}

impl DaybookTotals {
    fn add(&mut self, entry_type: TransactionType, amount: f64) {
        let (income, expense) = entry_type.split_amount(amount);
        self.income += income;
        self.expense += expense;
        self.net = self.income - self.expense;
    }
}

/// The entries of a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaybookDay {
    pub date: Date,
    pub entries: Vec<DaybookEntry>,
    pub totals: DaybookTotals,
}

/// The daybook for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Daybook {
    pub days: Vec<DaybookDay>,
    pub totals: DaybookTotals,
}

/// Group `entries`, which must already be sorted by date, into days.
pub fn group_by_day(entries: Vec<DaybookEntry>) -> Daybook {
    let mut days: Vec<DaybookDay> = Vec::new();
    let mut totals = DaybookTotals::default();

    for entry in entries {
        totals.add(entry.entry_type, entry.amount);

        let day = match days.last_mut() {
            Some(current) if current.date == entry.date => current,
            _ => {
                days.push(DaybookDay {
                    date: entry.date,
                    entries: Vec::new(),
                    totals: DaybookTotals::default(),
                });
                days.last_mut().expect("day just added")
            }
        };

        day.totals.add(entry.entry_type, entry.amount);
        day.entries.push(entry);
    }

    Daybook { days, totals }
}
