//! The owned loan collection and the persistence seam it is loaded from and
//! saved to. The engine never performs I/O itself; a [`LoanStore`] does.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::LoanTrackerError;
use crate::loan::{create_loan, Loan, LoanInput};
use crate::LoanTrackerResult;

/// Document store holding the full, ordered loan collection.
pub trait LoanStore {
    /// Fetch every loan. An empty store yields an empty collection.
    fn load(&self) -> LoanTrackerResult<Vec<Loan>>;

    /// Replace the stored collection. Failures are reported, not retried.
    fn save(&self, loans: &[Loan]) -> LoanTrackerResult<()>;
}

/// In-process store, useful as a scratch collaborator and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    loans: RefCell<Vec<Loan>>,
}

impl MemoryStore {
    pub fn new(loans: Vec<Loan>) -> Self {
        Self {
            loans: RefCell::new(loans),
        }
    }

    pub fn snapshot(&self) -> Vec<Loan> {
        self.loans.borrow().clone()
    }
}

impl LoanStore for MemoryStore {
    fn load(&self) -> LoanTrackerResult<Vec<Loan>> {
        Ok(self.loans.borrow().clone())
    }

    fn save(&self, loans: &[Loan]) -> LoanTrackerResult<()> {
        *self.loans.borrow_mut() = loans.to_vec();
        Ok(())
    }
}

/// Ordered collection of loans. Indices are positions in the list, so
/// deleting a loan shifts every later index down by one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanBook {
    loans: Vec<Loan>,
}

impl LoanBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `store`. The returned flag is true when any loan needed its
    /// statement rebuilt, in which case the caller should save again.
    pub fn load_from(store: &impl LoanStore) -> LoanTrackerResult<(Self, bool)> {
        let mut book = Self::new();
        let repaired = book.replace(store.load()?)?;
        Ok((book, repaired))
    }

    pub fn save_to(&self, store: &impl LoanStore) -> LoanTrackerResult<()> {
        store.save(&self.loans)?;
        debug!(loans = self.loans.len(), "loan book saved");
        Ok(())
    }

    /// Replace the in-memory collection with one delivered by the store.
    /// Loans that arrive without a statement get one generated.
    pub fn replace(&mut self, mut loans: Vec<Loan>) -> LoanTrackerResult<bool> {
        let mut repaired = false;
        for loan in loans.iter_mut() {
            repaired |= loan.ensure_statement()?;
        }
        if repaired {
            info!("regenerated missing statements on load");
        }
        self.loans = loans;
        Ok(repaired)
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    pub fn get(&self, index: usize) -> LoanTrackerResult<&Loan> {
        let count = self.loans.len();
        self.loans
            .get(index)
            .ok_or(LoanTrackerError::LoanNotFound { index, count })
    }

    pub fn get_mut(&mut self, index: usize) -> LoanTrackerResult<&mut Loan> {
        let count = self.loans.len();
        self.loans
            .get_mut(index)
            .ok_or(LoanTrackerError::LoanNotFound { index, count })
    }

    /// Create a loan from `input` and append it. Returns its index.
    pub fn add_loan(&mut self, input: &LoanInput) -> LoanTrackerResult<usize> {
        let loan = create_loan(input)?;
        self.loans.push(loan);
        Ok(self.loans.len() - 1)
    }

    /// Remove and return the loan at `index`.
    pub fn delete_loan(&mut self, index: usize) -> LoanTrackerResult<Loan> {
        let count = self.loans.len();
        if index >= count {
            return Err(LoanTrackerError::LoanNotFound { index, count });
        }
        let removed = self.loans.remove(index);
        info!(index, remaining = self.loans.len(), "loan deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn input(principal: rust_decimal::Decimal) -> LoanInput {
        LoanInput {
            name: None,
            principal,
            interest_rate: dec!(9),
            tenure: 24,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        }
    }

    #[test]
    fn test_add_and_delete_shift_indices() {
        let mut book = LoanBook::new();
        assert_eq!(book.add_loan(&input(dec!(1000))).unwrap(), 0);
        assert_eq!(book.add_loan(&input(dec!(2000))).unwrap(), 1);
        assert_eq!(book.add_loan(&input(dec!(3000))).unwrap(), 2);

        let removed = book.delete_loan(1).unwrap();
        assert_eq!(removed.principal, dec!(2000));
        assert_eq!(book.len(), 2);
        assert_eq!(book.get(1).unwrap().principal, dec!(3000));
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut book = LoanBook::new();
        let err = book.delete_loan(0).unwrap_err();
        assert!(matches!(err, LoanTrackerError::LoanNotFound { index: 0, count: 0 }));
    }

    #[test]
    fn test_replace_repairs_empty_statements() {
        let mut loan = create_loan(&input(dec!(5000))).unwrap();
        loan.statement.clear();
        let mut book = LoanBook::new();
        assert!(book.replace(vec![loan]).unwrap());
        assert_eq!(book.get(0).unwrap().statement.len(), 24);
    }

    #[test]
    fn test_round_trip_through_memory_store() {
        let store = MemoryStore::default();
        let mut book = LoanBook::new();
        book.add_loan(&input(dec!(7500))).unwrap();
        book.save_to(&store).unwrap();

        let (loaded, repaired) = LoanBook::load_from(&store).unwrap();
        assert!(!repaired);
        assert_eq!(loaded, book);
    }
}
