//! Run command - replay a script against a fresh registry.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use steward_config::{Config, JournalSection};
use steward_core::Principal;
use steward_registry::{
    AuditRecord, AuditSink, AuthorityRegistry, FnSubscriber, KvAuditSink, Outcome, RegistryError,
};
use steward_storage::{KvStore, SurrealKvStore};
use tracing::{info, warn};

use crate::script::{AddressBook, Script, Step};
use crate::theme::Theme;

/// What a single step did.
#[derive(Debug)]
pub(crate) enum StepResult {
    Applied(AuditRecord),
    Unchanged,
    Failed(RegistryError),
    Checked { principal: Principal, authorized: bool },
    Listed(Vec<Principal>),
}

/// Result of one step, numbered from 1.
#[derive(Debug)]
pub(crate) struct StepReport {
    pub(crate) number: usize,
    pub(crate) step: Step,
    pub(crate) result: StepResult,
}

/// A registry built for a replay, with its durable sink if one is enabled.
pub(crate) struct Session {
    pub(crate) registry: AuthorityRegistry,
    pub(crate) sink: Option<Arc<KvAuditSink>>,
    store: Option<Arc<SurrealKvStore>>,
}

impl Session {
    /// Flush and close the on-disk store, if any.
    pub(crate) async fn close(self) -> anyhow::Result<()> {
        drop(self.sink);
        if let Some(store) = self.store {
            store.close().await?;
        }
        Ok(())
    }
}

/// Build a registry bootstrapped by `creator` according to `[journal]`.
///
/// With `persist` set, records go to a SurrealKV store at `journal.path`.
/// A fresh registry starts its journal at sequence 0, so a namespace that
/// already holds records is refused.
pub(crate) async fn open_session(
    creator: Principal,
    journal: &JournalSection,
) -> anyhow::Result<Session> {
    let observer = FnSubscriber::new("cli-log", |record: &AuditRecord| {
        info!(
            sequence = record.sequence,
            event = %record.event.description(),
            "audit record committed"
        );
    });

    let mut builder = AuthorityRegistry::builder(creator)
        .channel_capacity(journal.channel_capacity)
        .subscriber(Arc::new(observer));

    let (sink, store) = if journal.persist {
        let path = journal
            .path
            .as_deref()
            .context("journal.persist is set but journal.path is not")?;
        let store = Arc::new(SurrealKvStore::open(path)?);
        let sink = Arc::new(KvAuditSink::new(
            Arc::clone(&store) as Arc<dyn KvStore>,
            journal.namespace.clone(),
        )?);

        let existing = sink.load()?.len();
        if existing > 0 {
            drop(sink);
            store.close().await?;
            anyhow::bail!(
                "{} already holds {existing} records in namespace {}",
                path.display(),
                journal.namespace
            );
        }

        builder = builder.sink(Arc::clone(&sink) as Arc<dyn AuditSink>);
        (Some(sink), Some(store))
    } else {
        (None, None)
    };

    Ok(Session {
        registry: builder.build()?,
        sink,
        store,
    })
}

/// Replay `steps` in order. Failed calls are reported and replay continues.
pub(crate) fn replay(
    registry: &mut AuthorityRegistry,
    steps: &[Step],
    book: &mut AddressBook,
) -> anyhow::Result<Vec<StepReport>> {
    let mut reports = Vec::with_capacity(steps.len());

    for (number, step) in (1usize..).zip(steps) {
        let result = match step {
            Step::Grant { caller, subject } => {
                let (caller, subject) = (book.resolve(caller)?, book.resolve(subject)?);
                outcome(registry.grant(caller, subject))
            },
            Step::Revoke { caller, subject } => {
                let (caller, subject) = (book.resolve(caller)?, book.resolve(subject)?);
                outcome(registry.revoke(caller, subject))
            },
            Step::Check { principal } => {
                let principal = book.resolve(principal)?;
                StepResult::Checked {
                    principal,
                    authorized: registry.is_authorized(principal),
                }
            },
            Step::List => StepResult::Listed(registry.list_authorized()),
        };

        if let StepResult::Failed(e) = &result {
            warn!(step = number, error = %e, "step failed");
        }

        reports.push(StepReport {
            number,
            step: step.clone(),
            result,
        });
    }

    Ok(reports)
}

fn outcome(result: Result<Outcome, RegistryError>) -> StepResult {
    match result {
        Ok(Outcome::Applied(record)) => StepResult::Applied(record),
        Ok(Outcome::Unchanged) => StepResult::Unchanged,
        Err(e) => StepResult::Failed(e),
    }
}

/// Entry point for `steward run`.
pub(crate) async fn run_script(path: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    let script = Script::load(path)?;
    let mut book = AddressBook::new();

    let creator_name = script
        .creator
        .as_deref()
        .or(config.registry.creator.as_deref())
        .context("script has no creator and registry.creator is not configured")?;
    let creator = book.resolve(creator_name)?;

    let mut session = open_session(creator, &config.journal).await?;
    let result = report(&mut session, &script, &mut book, json, config);
    session.close().await?;
    result
}

fn report(
    session: &mut Session,
    script: &Script,
    book: &mut AddressBook,
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let reports = replay(&mut session.registry, &script.steps, book)?;

    if json {
        for record in session.registry.journal().records() {
            println!("{}", serde_json::to_string(record)?);
        }
    } else {
        print_reports(&reports, book);
        print_authorized(&session.registry, book);
        print_journal(session.registry.journal().records(), book);
    }

    if let Some(sink) = &session.sink {
        let persisted = sink.load()?;
        anyhow::ensure!(
            persisted == session.registry.journal().records(),
            "durable journal diverged from the in-memory journal"
        );
        if !json {
            println!(
                "{}",
                Theme::info(&format!(
                    "{} records persisted to {} in {}",
                    persisted.len(),
                    sink.namespace(),
                    config
                        .journal
                        .path
                        .as_deref()
                        .unwrap_or_else(|| Path::new("?"))
                        .display()
                ))
            );
        }
    }

    if session.registry.is_locked_out() {
        eprintln!(
            "{}",
            Theme::warning("no principal is authorized; the registry is locked")
        );
    }

    Ok(())
}

fn describe_step(step: &Step) -> String {
    match step {
        Step::Grant { caller, subject } => format!("grant   {caller} -> {subject}"),
        Step::Revoke { caller, subject } => format!("revoke  {caller} -> {subject}"),
        Step::Check { principal } => format!("check   {principal}"),
        Step::List => "list".to_owned(),
    }
}

fn print_reports(reports: &[StepReport], book: &AddressBook) {
    println!("\n{}", Theme::header("Steps"));
    println!("{}", Theme::separator());

    for report in reports {
        let status = match &report.result {
            StepResult::Applied(record) => {
                Theme::success(&format!("applied (#{})", record.sequence))
            },
            StepResult::Unchanged => Theme::dimmed("unchanged"),
            StepResult::Failed(RegistryError::NotAuthorized { caller }) => {
                Theme::error(&format!("denied: {} is not authorized", book.name(*caller)))
            },
            StepResult::Failed(e) => Theme::error(&e.to_string()),
            StepResult::Checked {
                principal,
                authorized,
            } => {
                let verdict = if *authorized {
                    "authorized"
                } else {
                    "not authorized"
                };
                format!("{} {verdict}", Theme::principal(&book.name(*principal)))
            },
            StepResult::Listed(list) => list
                .iter()
                .map(|p| Theme::principal(&book.name(*p)))
                .collect::<Vec<_>>()
                .join(", "),
        };
        println!(
            "{:>4}  {:<32} {status}",
            report.number,
            describe_step(&report.step)
        );
    }
}

fn print_authorized(registry: &AuthorityRegistry, book: &AddressBook) {
    println!("\n{}", Theme::header("Authorized"));
    println!("{}", Theme::separator());

    let authorized = registry.list_authorized();
    if authorized.is_empty() {
        println!("{}", Theme::info("nobody"));
    }
    for principal in authorized {
        println!(
            "  {:<16} {}",
            Theme::principal(&book.name(principal)),
            Theme::dimmed(&principal.to_hex())
        );
    }
}

fn print_journal(records: &[AuditRecord], book: &AddressBook) {
    println!("\n{}", Theme::header("Audit Journal"));
    println!("{}", Theme::separator());

    for record in records {
        println!(
            "{:>4}  {}  {}  {} -> {}",
            record.sequence,
            Theme::timestamp(&record.recorded_at),
            Theme::kind(record.event.kind),
            Theme::principal(&book.name(record.event.actor)),
            Theme::principal(&book.name(record.event.subject)),
        );
    }
    println!();
}
