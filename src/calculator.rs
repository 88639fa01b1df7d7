use std::path::Path;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::calculation::Calculation;
use crate::config::CalculatorConfig;
use crate::fileio::HistoryFile;
use crate::history::observer::{AutoSaveObserver, HistoryObserver, LoggingObserver};
use crate::history::snapshot::Snapshot;
use crate::history::undo::UndoHistory;
use crate::logging::Logger;
use crate::numeric::operations::OperationRegistry;
use crate::numeric::validate::{round_output, validate_two_numbers, Operand};
use crate::util::CalcError;

/// Calculator core: the calculation log, its undo/redo snapshots and the
/// observers notified on every new calculation.
///
/// `perform`, `clear` and `load` are the mutating calls. Each one pushes the
/// pre-mutation log onto the undo stack and discards the redo stack; a call
/// that fails leaves all three untouched.
pub struct Calculator {
    config: CalculatorConfig,
    logger: Logger,
    registry: OperationRegistry,
    history: Vec<Calculation>,
    undo: UndoHistory,
    observers: Vec<Box<dyn HistoryObserver>>,
}

impl Calculator {
    /// Calculator with the logging and auto-save observers installed
    pub fn new(config: CalculatorConfig, logger: Logger) -> Self {
        let observers: Vec<Box<dyn HistoryObserver>> = vec![
            Box::new(LoggingObserver::new(logger.clone())),
            Box::new(AutoSaveObserver),
        ];
        Self::with_observers(config, logger, observers)
    }

    pub fn with_observers(
        config: CalculatorConfig,
        logger: Logger,
        observers: Vec<Box<dyn HistoryObserver>>,
    ) -> Self {
        Self {
            config,
            logger,
            registry: OperationRegistry::default(),
            history: Vec::new(),
            undo: UndoHistory::new(),
            observers,
        }
    }

    #[allow(dead_code)]
    pub fn register_observer(&mut self, observer: Box<dyn HistoryObserver>) {
        self.observers.push(observer);
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    #[allow(dead_code)]
    pub fn registry_mut(&mut self) -> &mut OperationRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Oldest first
    pub fn history(&self) -> &[Calculation] {
        &self.history
    }

    #[allow(dead_code)]
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    #[allow(dead_code)]
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    #[allow(dead_code)]
    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    #[allow(dead_code)]
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    /// Validate, execute and record one operation, returning the rounded result
    pub fn perform(
        &mut self,
        op_name: &str,
        a: impl Into<Operand>,
        b: impl Into<Operand>,
    ) -> Result<Decimal, CalcError> {
        let (a, b) = (a.into(), b.into());
        let calc = self.compute(op_name, &a, &b).map_err(|e| {
            self.logger
                .scope(|| warn!(operation = op_name, kind = e.kind(), "rejected: {}", e));
            e
        })?;
        self.undo.record(Snapshot::capture(&self.history));
        self.history.push(calc.clone());
        self.enforce_cap();

        self.notify(&calc);
        Ok(calc.result)
    }

    /// Everything in `perform` that can fail, with no side effects
    fn compute(&self, op_name: &str, a: &Operand, b: &Operand) -> Result<Calculation, CalcError> {
        let (da, db) = validate_two_numbers(a, b, &self.config)?;
        let op = self.registry.get(op_name)?;
        let raw = op(da, db, &self.config)?;
        let result = round_output(raw, self.config.precision)?;
        Ok(Calculation::new(op_name, da, db, result))
    }

    fn notify(&mut self, calc: &Calculation) {
        for observer in self.observers.iter_mut() {
            if let Err(e) = observer.on_new_calculation(calc, &self.history, &self.config) {
                let name = observer.name();
                self.logger
                    .scope(|| warn!(observer = name, error = %e, "observer failed"));
            }
        }
    }

    /// Keep only the newest `max_history_size` records
    fn enforce_cap(&mut self) {
        let cap = self.config.max_history_size;
        if self.history.len() > cap {
            let excess = self.history.len() - cap;
            self.history.drain(..excess);
        }
    }

    /// Empty the log. A no-op (nothing recorded for undo) when already empty.
    pub fn clear(&mut self) {
        if self.history.is_empty() {
            return;
        }
        self.undo.record(Snapshot::capture(&self.history));
        self.history.clear();
        self.logger.scope(|| info!("history cleared"));
    }

    /// Returns `false` when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        let current = Snapshot::capture(&self.history);
        match self.undo.undo(current) {
            Some(previous) => {
                self.history = previous.into_records();
                self.logger
                    .scope(|| info!("undo: {} records", self.history.len()));
                true
            }
            None => false,
        }
    }

    /// Returns `false` when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        let current = Snapshot::capture(&self.history);
        match self.undo.redo(current) {
            Some(next) => {
                self.history = next.into_records();
                self.logger
                    .scope(|| info!("redo: {} records", self.history.len()));
                true
            }
            None => false,
        }
    }

    /// Replace the whole log. Undoable like any other mutation; observers
    /// are not notified.
    pub fn load_records(&mut self, records: Vec<Calculation>) {
        self.undo.record(Snapshot::capture(&self.history));
        self.history = records;
        self.enforce_cap();
        self.logger
            .scope(|| info!("history loaded: {} records", self.history.len()));
    }

    /// Write the log to the configured history file
    pub fn save(&self) -> Result<(), CalcError> {
        self.save_to(&self.config.history_file())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CalcError> {
        HistoryFile::new(path)
            .write(&self.history)
            .map_err(|e| {
                self.logger.scope(|| warn!("{}", e));
                e
            })?;
        self.logger.scope(|| {
            info!("history saved: {} records to {}", self.history.len(), path.display())
        });
        Ok(())
    }

    /// Replace the log with the configured history file's contents
    pub fn load(&mut self) -> Result<(), CalcError> {
        let path = self.config.history_file();
        self.load_from(&path)
    }

    pub fn load_from(&mut self, path: &Path) -> Result<(), CalcError> {
        let records = HistoryFile::new(path).read().map_err(|e| {
            self.logger.scope(|| warn!("{}", e));
            e
        })?;
        self.load_records(records);
        Ok(())
    }
}
