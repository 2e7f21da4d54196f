//! Snapshot transactions with a savepoint stack
//!
//! Beginning a transaction snapshots the whole engine state; each savepoint
//! snapshots it again. Rolling back restores the snapshot.

use geokairos_types::{ConnectionError, Savepoint};

use crate::EngineState;

#[derive(Debug, Clone)]
struct SavepointFrame {
    savepoint: Savepoint,
    snapshot: EngineState,
}

#[derive(Debug, Clone)]
enum TransactionState {
    None,
    Active { id: u64, original: EngineState, savepoints: Vec<SavepointFrame> },
}

#[derive(Debug, Clone)]
pub struct TransactionManager {
    transaction_state: TransactionState,
    next_transaction_id: u64,
    next_savepoint_id: u64,
}

impl TransactionManager {
    pub fn new() -> Self {
        TransactionManager {
            transaction_state: TransactionState::None,
            next_transaction_id: 1,
            next_savepoint_id: 1,
        }
    }

    pub fn begin(&mut self, state: &EngineState) -> Result<(), ConnectionError> {
        match self.transaction_state {
            TransactionState::None => {
                let id = self.next_transaction_id;
                self.next_transaction_id += 1;
                self.transaction_state = TransactionState::Active {
                    id,
                    original: state.clone(),
                    savepoints: Vec::new(),
                };
                Ok(())
            }
            TransactionState::Active { .. } => {
                Err(ConnectionError::Transaction("Transaction already active".to_string()))
            }
        }
    }

    /// Keep every change; savepoints die with the transaction
    pub fn commit(&mut self) -> Result<(), ConnectionError> {
        match self.transaction_state {
            TransactionState::None => {
                Err(ConnectionError::Transaction("No active transaction to commit".to_string()))
            }
            TransactionState::Active { .. } => {
                self.transaction_state = TransactionState::None;
                Ok(())
            }
        }
    }

    pub fn rollback(&mut self, state: &mut EngineState) -> Result<(), ConnectionError> {
        match std::mem::replace(&mut self.transaction_state, TransactionState::None) {
            TransactionState::None => {
                Err(ConnectionError::Transaction("No active transaction to rollback".to_string()))
            }
            TransactionState::Active { original, .. } => {
                *state = original;
                Ok(())
            }
        }
    }

    pub fn in_transaction(&self) -> bool {
        matches!(self.transaction_state, TransactionState::Active { .. })
    }

    pub fn transaction_id(&self) -> Option<u64> {
        match &self.transaction_state {
            TransactionState::Active { id, .. } => Some(*id),
            TransactionState::None => None,
        }
    }

    /// Savepoints not yet released or rolled past
    pub fn outstanding_savepoints(&self) -> usize {
        match &self.transaction_state {
            TransactionState::Active { savepoints, .. } => savepoints.len(),
            TransactionState::None => 0,
        }
    }

    pub fn create_savepoint(&mut self, state: &EngineState) -> Result<Savepoint, ConnectionError> {
        match &mut self.transaction_state {
            TransactionState::None => {
                Err(ConnectionError::Transaction("No active transaction".to_string()))
            }
            TransactionState::Active { savepoints, .. } => {
                let id = self.next_savepoint_id;
                self.next_savepoint_id += 1;
                let savepoint = Savepoint { id, name: format!("SAVEPOINT_{}", id) };
                savepoints.push(SavepointFrame { savepoint: savepoint.clone(), snapshot: state.clone() });
                Ok(savepoint)
            }
        }
    }

    /// Restore the state as of `savepoint`; later savepoints are destroyed
    pub fn rollback_to_savepoint(
        &mut self,
        savepoint: &Savepoint,
        state: &mut EngineState,
    ) -> Result<(), ConnectionError> {
        let savepoints = self.savepoints_mut()?;
        let idx = position(savepoints, savepoint)?;
        *state = savepoints[idx].snapshot.clone();
        savepoints.truncate(idx + 1);
        Ok(())
    }

    /// Destroy `savepoint` and every savepoint created after it
    pub fn release_savepoint(&mut self, savepoint: &Savepoint) -> Result<(), ConnectionError> {
        let savepoints = self.savepoints_mut()?;
        let idx = position(savepoints, savepoint)?;
        savepoints.truncate(idx);
        Ok(())
    }

    fn savepoints_mut(&mut self) -> Result<&mut Vec<SavepointFrame>, ConnectionError> {
        match &mut self.transaction_state {
            TransactionState::None => {
                Err(ConnectionError::Transaction("No active transaction".to_string()))
            }
            TransactionState::Active { savepoints, .. } => Ok(savepoints),
        }
    }
}

fn position(savepoints: &[SavepointFrame], savepoint: &Savepoint) -> Result<usize, ConnectionError> {
    savepoints.iter().position(|frame| frame.savepoint == *savepoint).ok_or_else(|| {
        ConnectionError::Transaction(format!("Savepoint '{}' not found", savepoint.name))
    })
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_sequence(name: &str) -> EngineState {
        let mut state = EngineState::default();
        state.sequences.insert(name.to_string(), 0);
        state
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let mut tm = TransactionManager::new();
        let mut state = EngineState::default();
        tm.begin(&state).unwrap();
        state.sequences.insert("s".to_string(), 0);
        tm.rollback(&mut state).unwrap();
        assert!(state.sequences.is_empty());
        assert!(!tm.in_transaction());
    }

    #[test]
    fn test_savepoint_rollback_and_release() {
        let mut tm = TransactionManager::new();
        let mut state = EngineState::default();
        tm.begin(&state).unwrap();

        state = state_with_sequence("a");
        let first = tm.create_savepoint(&state).unwrap();
        state.sequences.insert("b".to_string(), 0);
        let _second = tm.create_savepoint(&state).unwrap();
        assert_eq!(tm.outstanding_savepoints(), 2);

        tm.rollback_to_savepoint(&first, &mut state).unwrap();
        assert_eq!(state.sequences.len(), 1);
        assert_eq!(tm.outstanding_savepoints(), 1);

        tm.release_savepoint(&first).unwrap();
        assert_eq!(tm.outstanding_savepoints(), 0);
        assert!(tm.release_savepoint(&first).is_err());
    }

    #[test]
    fn test_savepoint_requires_transaction() {
        let mut tm = TransactionManager::new();
        assert!(matches!(
            tm.create_savepoint(&EngineState::default()),
            Err(ConnectionError::Transaction(_))
        ));
        assert!(tm.commit().is_err());
    }
}
