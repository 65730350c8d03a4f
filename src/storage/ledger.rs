use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Lines, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::domain::{AccountNumber, TransactionRecord};

use super::{DEFAULT_LEDGER_PATH, LedgerFormat};

/// Where the ledger lives and how its lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub path: PathBuf,
    pub format: LedgerFormat,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LEDGER_PATH),
            format: LedgerFormat::default(),
        }
    }
}

/// Append-only file of successful transactions.
///
/// The file is opened for the duration of a single append or read and closed
/// when the handle drops; nothing is cached in memory.
#[derive(Debug, Clone)]
pub struct TransactionLedger {
    path: PathBuf,
    format: LedgerFormat,
}

impl TransactionLedger {
    pub fn new(path: impl Into<PathBuf>, format: LedgerFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.path.clone(), config.format)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> LedgerFormat {
        self.format
    }

    /// Create the file with its header if it does not exist yet.
    /// Returns true when the file was created by this call. An existing file
    /// written in another format is an error, so the two never get mixed.
    pub fn initialize(&self) -> Result<bool> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                self.ensure_format()?;
                return Ok(false);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create ledger {}", self.path.display()));
            }
        };

        file.write_all(self.format.header().as_bytes())
            .context("Failed to write ledger header")?;
        tracing::info!(path = %self.path.display(), format = %self.format, "created transaction ledger");
        Ok(true)
    }

    /// Append one record as a single line.
    pub fn append(&self, record: &TransactionRecord) -> Result<()> {
        let mut line = self.format.encode(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open ledger {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .context("Failed to append transaction record")?;

        tracing::debug!(
            account = record.account_number,
            kind = %record.kind,
            amount = %record.amount,
            "appended ledger record"
        );
        Ok(())
    }

    /// Records for one account, oldest first. Empty if there are none or the
    /// ledger file does not exist.
    pub fn query_by_account(&self, account_number: AccountNumber) -> Result<Records> {
        Ok(self.open_records()?.for_account(account_number))
    }

    /// Every record, oldest first.
    pub fn query_all(&self) -> Result<Records> {
        self.open_records()
    }

    /// Every line exactly as stored, header included.
    pub fn raw_lines(&self) -> Result<Vec<String>> {
        match self.open_reader()? {
            Some(reader) => reader
                .lines()
                .collect::<io::Result<Vec<_>>>()
                .context("Failed to read ledger"),
            None => Ok(Vec::new()),
        }
    }

    /// Erase every record and start over with an empty, initialized ledger.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to remove ledger {}", self.path.display()));
            }
        }
        self.initialize()?;
        tracing::info!(path = %self.path.display(), "cleared transaction ledger");
        Ok(())
    }

    fn ensure_format(&self) -> Result<()> {
        let Some(reader) = self.open_reader()? else {
            return Ok(());
        };
        let first = reader
            .lines()
            .map_while(|line| line.ok())
            .find(|line| !line.trim().is_empty());
        let Some(first) = first else {
            return Ok(());
        };

        match LedgerFormat::detect(&first) {
            Some(found) if found == self.format => Ok(()),
            Some(found) => bail!(
                "Ledger {} is in {} format, not {}",
                self.path.display(),
                found,
                self.format
            ),
            None => bail!(
                "Ledger {} is not a {} ledger: {}",
                self.path.display(),
                self.format,
                first
            ),
        }
    }

    fn open_reader(&self) -> Result<Option<BufReader<File>>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to open ledger {}", self.path.display())),
        }
    }

    fn open_records(&self) -> Result<Records> {
        Ok(Records {
            lines: self.open_reader()?.map(|reader| reader.lines()),
            format: self.format,
            account: None,
        })
    }
}

/// Lazy iterator over ledger records. Lines are read and decoded on demand;
/// calling the query again starts a fresh pass from the beginning of the file.
pub struct Records {
    lines: Option<Lines<BufReader<File>>>,
    format: LedgerFormat,
    account: Option<AccountNumber>,
}

impl Records {
    fn for_account(mut self, account_number: AccountNumber) -> Self {
        self.account = Some(account_number);
        self
    }
}

impl Iterator for Records {
    type Item = Result<TransactionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        for line in lines.by_ref() {
            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(e).context("Failed to read ledger")),
            };
            if self.format.is_decoration(&line) {
                continue;
            }
            match self.format.decode(&line) {
                Ok(record) if self.account.is_none_or(|n| n == record.account_number) => {
                    return Some(Ok(record));
                }
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
