use tracing::info;

use crate::calculation::Calculation;
use crate::config::CalculatorConfig;
use crate::fileio::HistoryFile;
use crate::logging::Logger;
use crate::util::CalcError;

/// Reacts to each calculation appended to the history.
///
/// Called synchronously, in registration order, before `perform` returns.
/// An `Err` is logged by the calculator and never reaches the caller or the
/// remaining observers.
pub trait HistoryObserver {
    fn name(&self) -> &str;

    fn on_new_calculation(
        &mut self,
        calc: &Calculation,
        history: &[Calculation],
        cfg: &CalculatorConfig,
    ) -> Result<(), CalcError>;
}

/// Writes a one-line summary of every calculation to the log
pub struct LoggingObserver {
    logger: Logger,
}

impl LoggingObserver {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl HistoryObserver for LoggingObserver {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_new_calculation(
        &mut self,
        calc: &Calculation,
        _history: &[Calculation],
        _cfg: &CalculatorConfig,
    ) -> Result<(), CalcError> {
        self.logger.scope(|| info!("{}", calc.summary()));
        Ok(())
    }
}

/// Rewrites the history file after every calculation when auto-save is on
#[derive(Default)]
pub struct AutoSaveObserver;

impl HistoryObserver for AutoSaveObserver {
    fn name(&self) -> &str {
        "autosave"
    }

    fn on_new_calculation(
        &mut self,
        _calc: &Calculation,
        history: &[Calculation],
        cfg: &CalculatorConfig,
    ) -> Result<(), CalcError> {
        if !cfg.auto_save {
            return Ok(());
        }
        HistoryFile::new(cfg.history_file()).write(history)
    }
}
