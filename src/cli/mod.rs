use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use crate::application::{BankingService, TransactionReceipt};
use crate::domain::{
    Account, AccountKind, AccountNumber, AccountSnapshot, BusinessTerms, CheckingTerms, Money,
    SavingsTerms, TransactionRecord, format_money, parse_money,
};
use crate::storage::{DEFAULT_LEDGER_PATH, LedgerConfig, LedgerFormat};

/// Bankbook - accounts with per-kind rules and an append-only ledger
#[derive(Parser)]
#[command(name = "bankbook")]
#[command(about = "Savings, checking and business accounts backed by a transaction ledger")]
#[command(version)]
pub struct Cli {
    /// Ledger file path
    #[arg(short, long, env = "BANKBOOK_LEDGER", default_value = DEFAULT_LEDGER_PATH)]
    pub ledger: PathBuf,

    /// Ledger line format: json or legacy
    #[arg(short, long, env = "BANKBOOK_LEDGER_FORMAT", default_value = "json")]
    pub format: LedgerFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger file if it does not exist
    Init,

    /// Show the recorded transactions of one account
    History {
        /// Account number
        account: AccountNumber,
    },

    /// Show every recorded transaction
    Log {
        /// Print the ledger file as stored, header included
        #[arg(long)]
        raw: bool,
    },

    /// Erase all recorded transactions
    Clear {
        /// Confirm the ledger should be erased
        #[arg(long)]
        yes: bool,
    },

    /// Run account commands read line by line from a file or stdin
    Session {
        /// Command file (stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// One line of a session script.
#[derive(Parser)]
#[command(name = "session", no_binary_name = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Open a savings account
    OpenSavings {
        /// Account number (must be unique)
        number: AccountNumber,

        /// Account holder
        holder: String,

        /// Opening balance
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        balance: String,

        /// Interest rate as a fraction (e.g., "0.02" for 2%)
        #[arg(long)]
        rate: String,

        /// Interest period label (e.g., "monthly", "quarterly")
        #[arg(long, default_value = "monthly")]
        period: String,

        /// Maximum withdrawals per period
        #[arg(long)]
        withdrawal_limit: u32,
    },

    /// Open a checking account
    OpenChecking {
        /// Account number (must be unique)
        number: AccountNumber,

        /// Account holder
        holder: String,

        /// Opening balance
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        balance: String,

        /// Fee charged on every withdrawal
        #[arg(long, default_value = "0")]
        fee: String,

        /// How far below zero the balance may go
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        overdraft: String,

        /// Checkbook number
        #[arg(long, default_value = "0")]
        checkbook: u32,
    },

    /// Open a business account
    OpenBusiness {
        /// Account number (must be unique)
        number: AccountNumber,

        /// Account holder (company name)
        holder: String,

        /// Opening balance
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        balance: String,

        /// Legal form (e.g., "S.A.", "Ltda.")
        #[arg(long = "type")]
        business_type: String,

        /// Tax identification number
        #[arg(long)]
        tax_id: u64,

        /// Maximum total withdrawals per day
        #[arg(long)]
        daily_limit: String,
    },

    /// Deposit into an account
    Deposit {
        account: AccountNumber,

        /// Amount to deposit (e.g., "50.00" or "50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Withdraw from an account
    Withdraw {
        account: AccountNumber,

        /// Amount to withdraw (e.g., "50.00" or "50")
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Credit interest to an account
    Interest { account: AccountNumber },

    /// Show detailed account information
    Show { account: AccountNumber },

    /// List all accounts
    List,

    /// Show the recorded transactions of one account
    History { account: AccountNumber },

    /// Show every recorded transaction
    Log,

    /// Restore a savings account's withdrawal allowance
    ResetWithdrawals { account: AccountNumber },

    /// Restore a business account's daily allowance
    ResetDaily { account: AccountNumber },

    /// Restore the daily allowance of every business account
    NewDay,
}

impl Cli {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            path: self.ledger.clone(),
            format: self.format,
        }
    }

    pub fn run(self) -> Result<()> {
        let config = self.ledger_config();

        match self.command {
            Commands::Init => {
                BankingService::open(&config)?;
                println!("Ledger initialized: {}", config.path.display());
            }

            Commands::History { account } => {
                let service = BankingService::open(&config)?;
                print_records(&service.history(account)?);
            }

            Commands::Log { raw } => {
                let service = BankingService::open(&config)?;
                if raw {
                    for line in service.ledger().raw_lines()? {
                        println!("{}", line);
                    }
                } else {
                    print_records(&service.all_history()?);
                }
            }

            Commands::Clear { yes } => {
                if !yes {
                    bail!("Refusing to erase the ledger without --yes");
                }
                let service = BankingService::open(&config)?;
                service.clear_history()?;
                println!("Ledger cleared: {}", config.path.display());
            }

            Commands::Session { input } => {
                let mut service = BankingService::open(&config)?;
                let reader: Box<dyn BufRead> = match input {
                    Some(path) => Box::new(BufReader::new(
                        File::open(&path)
                            .with_context(|| format!("Failed to open {}", path.display()))?,
                    )),
                    None => Box::new(io::stdin().lock()),
                };
                let failed = run_session(&mut service, reader)?;
                if self.verbose {
                    eprintln!(
                        "[Session] {} account(s), {} failed command(s)",
                        service.account_count(),
                        failed
                    );
                }
            }
        }

        Ok(())
    }
}

/// Execute every command in `reader` against `service`. A failing command is
/// reported and the session moves on. Returns the number of failed commands.
pub fn run_session<R: BufRead>(service: &mut BankingService, reader: R) -> Result<usize> {
    let mut failed = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read session input")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parsed = split_args(line)
            .and_then(|args| SessionLine::try_parse_from(args).map_err(anyhow::Error::from));

        let result = parsed.and_then(|session_line| run_session_command(service, session_line.command));
        if let Err(e) = result {
            failed += 1;
            println!("Line {}:", index + 1);
            report_error(&e);
        }
    }

    Ok(failed)
}

fn run_session_command(service: &mut BankingService, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::OpenSavings {
            number,
            holder,
            balance,
            rate,
            period,
            withdrawal_limit,
        } => {
            let terms = SavingsTerms::new(parse_amount(&rate)?, period, withdrawal_limit);
            let account = Account::savings(number, holder, parse_amount(&balance)?, terms);
            let snapshot = service.open_account(account)?;
            println!("Opened {} account #{}", snapshot.kind, snapshot.number);
        }

        SessionCommand::OpenChecking {
            number,
            holder,
            balance,
            fee,
            overdraft,
            checkbook,
        } => {
            let overdraft = parse_amount(&overdraft)?;
            if overdraft < Money::ZERO {
                bail!("Overdraft limit must not be negative");
            }
            let terms = CheckingTerms::new(parse_amount(&fee)?, overdraft, checkbook);
            let account = Account::checking(number, holder, parse_amount(&balance)?, terms);
            let snapshot = service.open_account(account)?;
            println!("Opened {} account #{}", snapshot.kind, snapshot.number);
        }

        SessionCommand::OpenBusiness {
            number,
            holder,
            balance,
            business_type,
            tax_id,
            daily_limit,
        } => {
            let terms = BusinessTerms::new(business_type, tax_id, parse_amount(&daily_limit)?);
            let account = Account::business(number, holder, parse_amount(&balance)?, terms);
            let snapshot = service.open_account(account)?;
            println!("Opened {} account #{}", snapshot.kind, snapshot.number);
        }

        SessionCommand::Deposit { account, amount } => {
            let receipt = service.deposit(account, parse_amount(&amount)?)?;
            print_receipt("Deposit", &receipt);
        }

        SessionCommand::Withdraw { account, amount } => {
            let receipt = service.withdraw(account, parse_amount(&amount)?)?;
            print_receipt("Withdrawal", &receipt);
        }

        SessionCommand::Interest { account } => {
            let outcome = service.accrue_interest(account)?;
            match &outcome.receipt {
                Some(receipt) => {
                    println!("Interest credited: ${}", format_money(outcome.interest));
                    print_receipt("Interest", receipt);
                }
                None => println!("Account #{} does not accrue interest.", account),
            }
        }

        SessionCommand::Show { account } => {
            print_account(&service.describe_account(account)?);
        }

        SessionCommand::List => {
            print_accounts(&service.list_accounts());
        }

        SessionCommand::History { account } => {
            print_records(&service.history(account)?);
        }

        SessionCommand::Log => {
            print_records(&service.all_history()?);
        }

        SessionCommand::ResetWithdrawals { account } => {
            service.reset_withdrawals(account)?;
            println!("Withdrawal count reset for account #{}", account);
        }

        SessionCommand::ResetDaily { account } => {
            service.reset_daily_limit(account)?;
            println!("Daily limit reset for account #{}", account);
        }

        SessionCommand::NewDay => {
            let count = service.start_new_day();
            println!("Daily limits reset for {} business account(s)", count);
        }
    }

    Ok(())
}

/// Print an error and, for policy rejections, the shortfall behind it.
fn report_error(err: &anyhow::Error) {
    println!("Error: {}", err);
    if let Some(cause) = err.chain().nth(1) {
        println!("  Cause: {}", cause);
    }
}

fn parse_amount(input: &str) -> Result<Money> {
    parse_money(input).with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", input))
}

fn print_receipt(label: &str, receipt: &TransactionReceipt) {
    println!(
        "{} of ${} on account #{}. New balance: ${}",
        label,
        format_money(receipt.record.amount),
        receipt.record.account_number,
        format_money(receipt.record.resulting_balance)
    );
    if !receipt.persisted {
        println!("Warning: the ledger could not be written; this transaction is not recorded.");
    }
}

fn print_account(snapshot: &AccountSnapshot) {
    println!("Account #{}", snapshot.number);
    println!("  Holder:         {}", snapshot.holder);
    println!("  Type:           {}", snapshot.kind);
    println!("  Balance:        ${}", format_money(snapshot.balance));
    println!(
        "  Opened:         {}",
        snapshot.opened_at.format("%Y-%m-%d %H:%M:%S")
    );

    match &snapshot.kind {
        AccountKind::Savings(terms) => {
            println!("  Interest rate:  {}", format_rate(terms.interest_rate()));
            println!("  Period:         {}", terms.interest_period());
            println!(
                "  Withdrawals:    {}/{} ({} remaining)",
                terms.withdrawals_used(),
                terms.withdrawal_limit(),
                terms.withdrawals_remaining()
            );
        }
        AccountKind::Checking(terms) => {
            println!("  Fee:            ${}", format_money(terms.fixed_fee()));
            println!("  Overdraft:      ${}", format_money(terms.overdraft_limit()));
            println!("  Checkbook:      {}", terms.checkbook_number());
            if snapshot.is_overdrawn() {
                println!("  Status:         overdrawn");
            }
        }
        AccountKind::Business(terms) => {
            println!("  Business type:  {}", terms.business_type());
            println!("  Tax ID:         {}", terms.tax_id());
            println!(
                "  Available today: ${} of ${}",
                format_money(terms.available_today()),
                format_money(terms.daily_limit())
            );
        }
    }
}

fn print_accounts(accounts: &[AccountSnapshot]) {
    if accounts.is_empty() {
        println!("No accounts registered.");
        return;
    }

    println!(
        "{:<8} {:<10} {:<20} {:>14}  {}",
        "NUMBER", "TYPE", "HOLDER", "BALANCE", "DETAILS"
    );
    println!("{}", "-".repeat(80));
    for account in accounts {
        println!(
            "{:<8} {:<10} {:<20} {:>14}  {}",
            account.number,
            account.kind.as_str(),
            truncate(&account.holder, 20),
            format_money(account.balance),
            kind_summary(&account.kind)
        );
    }
}

fn print_records(records: &[TransactionRecord]) {
    if records.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!(
        "{:<20} {:<8} {:<11} {:>14} {:>14}",
        "TIMESTAMP", "ACCOUNT", "KIND", "AMOUNT", "BALANCE"
    );
    println!("{}", "-".repeat(71));
    for record in records {
        println!(
            "{:<20} {:<8} {:<11} {:>14} {:>14}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.account_number,
            record.kind.as_str(),
            format_money(record.amount),
            format_money(record.resulting_balance)
        );
    }
}

fn kind_summary(kind: &AccountKind) -> String {
    match kind {
        AccountKind::Savings(terms) => format!(
            "rate {}, withdrawals {}/{}",
            format_rate(terms.interest_rate()),
            terms.withdrawals_used(),
            terms.withdrawal_limit()
        ),
        AccountKind::Checking(terms) => format!(
            "fee ${}, overdraft ${}",
            format_money(terms.fixed_fee()),
            format_money(terms.overdraft_limit())
        ),
        AccountKind::Business(terms) => format!(
            "available today ${} of ${}",
            format_money(terms.available_today()),
            format_money(terms.daily_limit())
        ),
    }
}

fn format_rate(rate: Money) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

/// Split a command line into words; double quotes group words.
fn split_args(line: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_quotes {
        bail!("Unterminated quote in: {}", line);
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
